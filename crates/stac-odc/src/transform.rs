//! STAC item → ODC dataset transformation.
//!
//! Identity resolution, grid consolidation and footprint reprojection are
//! independent of each other; the assembler merges their results into a
//! [`CanonicalDataset`]. A transformer holds only read-only state and can be
//! shared across threads.

use serde_json::Map;
use tracing::{debug, instrument};

use crate::config::TransformConfig;
use crate::dataset::{CanonicalDataset, DatasetProperties, ProductRef, DATASET_SCHEMA, FILE_FORMAT};
use crate::error::Result;
use crate::footprint::{reproject_footprint, GeometryDrop};
use crate::grids::consolidate;
use crate::item::{CoreProperties, StacItem};
use crate::odc_uuid::odc_uuid;
use crate::product::ProfileRegistry;

/// Result of transforming one item.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub dataset: CanonicalDataset,
    /// Set when the footprint was left out of the dataset
    pub geometry_drop: Option<GeometryDrop>,
}

/// Converts STAC items into ODC dataset documents.
#[derive(Debug, Default)]
pub struct StacTransformer {
    config: TransformConfig,
    registry: ProfileRegistry,
}

impl StacTransformer {
    /// Transformer with the known mission profiles.
    pub fn new(config: TransformConfig) -> Self {
        Self::with_registry(config, ProfileRegistry::default())
    }

    /// Transformer with a custom profile registry.
    pub fn with_registry(config: TransformConfig, registry: ProfileRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// Transform an item, reporting why its footprint was dropped if it was.
    #[instrument(skip(self, item), fields(item = %item.id))]
    pub fn transform(&self, item: &StacItem) -> Result<Transformed> {
        let core = CoreProperties::from_properties(&item.properties)?;
        let identity = self.registry.resolve(item)?;
        let consolidated = consolidate(
            &item.assets,
            &self.config.default_grid,
            self.config.path_mode,
        )?;
        let footprint = reproject_footprint(&item.id, item.geometry.as_ref(), core.crs);

        let id = odc_uuid(
            &self.config.id_namespace,
            &self.config.id_version,
            &[identity.label.as_str()],
        );
        let datetime = normalize_datetime(&core.datetime);

        let (geometry, geometry_drop) = match footprint {
            Ok(geometry) => (Some(geometry), None),
            Err(drop) => (None, Some(drop)),
        };

        let dataset = CanonicalDataset {
            schema: DATASET_SCHEMA.to_string(),
            id,
            crs: core.crs.odc_string(),
            grids: consolidated.grids,
            product: ProductRef {
                name: identity.name,
            },
            label: identity.label,
            properties: DatasetProperties {
                processing_datetime: datetime.clone(),
                datetime,
                cloud_cover: core.cloud_cover,
                gsd: core.gsd,
                instrument: core.instrument,
                platform: core.platform,
                file_format: FILE_FORMAT.to_string(),
                region_code: identity.region_code,
            },
            measurements: consolidated.measurements,
            geometry,
            lineage: Map::new(),
        };

        debug!(
            id = %dataset.id,
            label = %dataset.label,
            product = %dataset.product.name,
            has_geometry = dataset.geometry.is_some(),
            "Transformed item"
        );

        Ok(Transformed {
            dataset,
            geometry_drop,
        })
    }

    /// Transform an item into its dataset document.
    pub fn transform_dataset(&self, item: &StacItem) -> Result<CanonicalDataset> {
        self.transform(item).map(|t| t.dataset)
    }
}

/// Rewrite a `…000+00:00` UTC suffix as `Z`.
///
/// Plain substring replacement; any other offset is left untouched.
pub fn normalize_datetime(datetime: &str) -> String {
    datetime.replace("000+00:00", "Z")
}

/// Transform with default settings, writing measurement paths as file names.
pub fn stac_transform(item: &StacItem) -> Result<CanonicalDataset> {
    StacTransformer::new(TransformConfig::default()).transform_dataset(item)
}

/// Transform with default settings, keeping asset hrefs as given.
pub fn stac_transform_absolute(item: &StacItem) -> Result<CanonicalDataset> {
    StacTransformer::new(TransformConfig::absolute()).transform_dataset(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_datetime() {
        assert_eq!(
            normalize_datetime("2021-04-12T10:07:03.123000+00:00"),
            "2021-04-12T10:07:03.123Z"
        );
        assert_eq!(normalize_datetime("2022-06-01T00:00:00Z"), "2022-06-01T00:00:00Z");
        assert_eq!(
            normalize_datetime("2021-04-12T10:07:03+00:00"),
            "2021-04-12T10:07:03+00:00"
        );
    }

    #[test]
    fn test_transformer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StacTransformer>();
    }
}
