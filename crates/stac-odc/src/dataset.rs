//! The ODC dataset document.

use odc_common::Geometry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::Result;
use crate::grids::{GridDescriptor, Measurement};

/// Schema identifier of ODC dataset documents.
pub const DATASET_SCHEMA: &str = "https://schemas.opendatacube.org/dataset";

/// File format recorded for every COG measurement.
pub const FILE_FORMAT: &str = "GeoTIFF";

/// A dataset document ready to be indexed.
///
/// Field order matches the serialized document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDataset {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub id: Uuid,
    /// Native CRS, e.g. `epsg:32633`
    pub crs: String,
    pub grids: BTreeMap<String, GridDescriptor>,
    pub product: ProductRef,
    pub label: String,
    pub properties: DatasetProperties,
    pub measurements: BTreeMap<String, Measurement>,
    /// Footprint in the native CRS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub lineage: Map<String, Value>,
}

/// Product the dataset belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub name: String,
}

/// Normalized dataset properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProperties {
    pub datetime: String,
    #[serde(rename = "odc:processing_datetime")]
    pub processing_datetime: String,
    #[serde(rename = "eo:cloud_cover")]
    pub cloud_cover: Number,
    #[serde(rename = "eo:gsd")]
    pub gsd: Number,
    #[serde(rename = "eo:instrument")]
    pub instrument: String,
    #[serde(rename = "eo:platform")]
    pub platform: String,
    #[serde(rename = "odc:file_format")]
    pub file_format: String,
    #[serde(
        rename = "odc:region_code",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub region_code: Option<String>,
}

impl CanonicalDataset {
    /// The grid a measurement refers to.
    pub fn grid_of(&self, measurement: &str) -> Option<&GridDescriptor> {
        let m = self.measurements.get(measurement)?;
        let key = m.grid.as_deref().unwrap_or(crate::grids::DEFAULT_GRID_KEY);
        self.grids.get(key)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize as a YAML document.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Parse a previously written JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
