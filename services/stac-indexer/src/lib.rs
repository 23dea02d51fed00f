//! Batch conversion of STAC item files into ODC dataset documents.
//!
//! Inputs are STAC item or feature-collection JSON files, or directories
//! walked for them. Every item is transformed independently; one failing
//! item never stops the rest of the batch.

pub mod config;
pub mod indexer;

pub use config::{load_config, ConfigOverrides};
pub use indexer::{
    collect_inputs, index_file, index_files, output_path, IndexOptions, IndexReport, ItemFailure,
    OutputFormat,
};
