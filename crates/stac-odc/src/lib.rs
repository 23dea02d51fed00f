//! STAC item to Open Data Cube dataset canonicalization.
//!
//! Converts a STAC item into an ODC dataset document:
//!
//! - resolves the product identity (label, product name, region code) from
//!   mission-specific metadata
//! - groups COG assets into shared grids with one `default` grid
//! - derives a deterministic dataset id from the label
//! - reprojects the footprint into the item's native CRS, dropping it when
//!   the result is not a valid geometry
//!
//! The transform is pure and synchronous; a [`StacTransformer`] can be
//! shared across threads.

pub mod config;
pub mod dataset;
pub mod error;
pub mod footprint;
pub mod grids;
pub mod item;
pub mod odc_uuid;
pub mod product;
mod transform;

// Re-exports
pub use config::{PathMode, TransformConfig};
pub use dataset::{CanonicalDataset, DatasetProperties, ProductRef, DATASET_SCHEMA};
pub use error::{Result, TransformError};
pub use footprint::GeometryDrop;
pub use grids::{consolidate, grid_key, GridDescriptor, Measurement};
pub use item::{items_from_document, Assets, GeoTransform, ItemProperties, StacAsset, StacItem};
pub use odc_uuid::{odc_uuid, ODC_NAMESPACE};
pub use product::{
    GenericProfile, MissionProfile, ProductIdentity, ProfileRegistry, Sentinel2Profile,
};
pub use transform::{
    normalize_datetime, stac_transform, stac_transform_absolute, StacTransformer, Transformed,
};
