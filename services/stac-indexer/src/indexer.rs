//! File discovery, parallel transformation and document output.

use anyhow::{Context, Result};
use rayon::prelude::*;
use stac_odc::{items_from_document, CanonicalDataset, StacItem, StacTransformer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Suffix of written dataset documents, before the format extension.
const DOCUMENT_SUFFIX: &str = ".odc-metadata";

/// Serialization of the written documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
        }
    }

    fn render(&self, dataset: &CanonicalDataset) -> stac_odc::Result<String> {
        match self {
            OutputFormat::Yaml => dataset.to_yaml(),
            OutputFormat::Json => dataset.to_json_pretty(),
        }
    }
}

/// Where and how documents are written.
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    /// Output directory; defaults to the directory of each input file
    pub output_dir: Option<PathBuf>,
    pub format: OutputFormat,
}

/// An item (or whole file) that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub source: PathBuf,
    /// Item id, absent when the file itself could not be read
    pub item: Option<String>,
    pub error: String,
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.item {
            Some(item) => write!(f, "{} [{}]: {}", self.source.display(), item, self.error),
            None => write!(f, "{}: {}", self.source.display(), self.error),
        }
    }
}

/// Outcome of a batch.
#[derive(Debug, Clone, Default)]
pub struct IndexReport {
    /// Documents written, in input order
    pub written: Vec<PathBuf>,
    pub failures: Vec<ItemFailure>,
    /// Datasets written without a footprint
    pub geometry_dropped: usize,
}

impl IndexReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn merge(mut self, other: IndexReport) -> Self {
        self.written.extend(other.written);
        self.failures.extend(other.failures);
        self.geometry_dropped += other.geometry_dropped;
        self
    }
}

/// Whether a path looks like a STAC input rather than a written document.
fn is_stac_input(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    name.ends_with(".json") && !name.ends_with(&format!("{}.json", DOCUMENT_SUFFIX))
}

/// Expand files and directories into the list of input files.
///
/// Files are taken as given. Directories are walked recursively for `*.json`
/// files, skipping previously written dataset documents; their contents are
/// returned sorted.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(path) {
                let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
                if entry.file_type().is_file() && is_stac_input(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            debug!(dir = %path.display(), files = found.len(), "Collected inputs from directory");
            inputs.extend(found);
        } else if path.is_file() {
            inputs.push(path.clone());
        } else {
            anyhow::bail!("Input not found: {}", path.display());
        }
    }

    Ok(inputs)
}

/// Output location of a dataset document.
pub fn output_path(source: &Path, label: &str, options: &IndexOptions) -> PathBuf {
    let dir = match &options.output_dir {
        Some(dir) => dir.clone(),
        None => source.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let file_name = format!(
        "{}{}.{}",
        label.replace(['/', '\\'], "_"),
        DOCUMENT_SUFFIX,
        options.format.extension()
    );
    dir.join(file_name)
}

fn read_items(path: &Path) -> Result<Vec<StacItem>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let document: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(items_from_document(document)?)
}

fn write_dataset(
    source: &Path,
    dataset: &CanonicalDataset,
    options: &IndexOptions,
) -> Result<PathBuf> {
    let target = output_path(source, &dataset.label, options);
    let content = options.format.render(dataset)?;
    fs::write(&target, content).with_context(|| format!("Failed to write {}", target.display()))?;
    Ok(target)
}

/// Transform every item of one input file.
pub fn index_file(transformer: &StacTransformer, path: &Path, options: &IndexOptions) -> IndexReport {
    let mut report = IndexReport::default();

    let items = match read_items(path) {
        Ok(items) => items,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Skipping unreadable input");
            report.failures.push(ItemFailure {
                source: path.to_path_buf(),
                item: None,
                error: format!("{:#}", e),
            });
            return report;
        }
    };

    for item in &items {
        let outcome = transformer
            .transform(item)
            .map_err(anyhow::Error::from)
            .and_then(|t| {
                let target = write_dataset(path, &t.dataset, options)?;
                Ok((target, t.geometry_drop))
            });

        match outcome {
            Ok((target, geometry_drop)) => {
                debug!(item = %item.id, output = %target.display(), "Wrote dataset document");
                if geometry_drop.is_some() {
                    report.geometry_dropped += 1;
                }
                report.written.push(target);
            }
            Err(e) => {
                warn!(file = %path.display(), item = %item.id, error = %e, "Failed to transform item");
                report.failures.push(ItemFailure {
                    source: path.to_path_buf(),
                    item: Some(item.id.clone()),
                    error: format!("{:#}", e),
                });
            }
        }
    }

    report
}

/// Transform all input files in parallel.
pub fn index_files(
    transformer: &StacTransformer,
    inputs: &[PathBuf],
    options: &IndexOptions,
) -> Result<IndexReport> {
    if let Some(dir) = &options.output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    let report = inputs
        .par_iter()
        .map(|path| index_file(transformer, path, options))
        .collect::<Vec<_>>()
        .into_iter()
        .fold(IndexReport::default(), IndexReport::merge);

    info!(
        files = inputs.len(),
        written = report.written.len(),
        failed = report.failures.len(),
        geometry_dropped = report.geometry_dropped,
        "Indexing finished"
    );

    Ok(report)
}
