//! Asset and grid consolidation.
//!
//! Raster assets that share a pixel spacing share a grid. The grid matching
//! the configured default key is emitted as `default`; bands on it carry no
//! `grid` reference.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::config::PathMode;
use crate::error::{Result, TransformError};
use crate::item::{Assets, GeoTransform};

/// Key of the default grid in the output document.
pub const DEFAULT_GRID_KEY: &str = "default";

/// Shape and transform shared by one or more bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDescriptor {
    /// Raster dimensions (rows, columns)
    pub shape: [u64; 2],
    /// Affine pixel-to-CRS transform
    pub transform: GeoTransform,
}

/// A band in the output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    pub path: String,
    /// Grid key, absent for bands on the default grid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<String>,
}

/// Consolidated measurements and grids of one item.
#[derive(Debug, Clone, PartialEq)]
pub struct Consolidated {
    pub grids: BTreeMap<String, GridDescriptor>,
    pub measurements: BTreeMap<String, Measurement>,
}

/// Render a float like Python's `format(value, "g")`.
///
/// Six significant digits, trailing zeros removed, scientific notation for
/// exponents below -4 or from 6 up.
pub fn format_general(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{:.5e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (5 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Grid key for a pixel spacing, e.g. `10.0` → `g10m`.
pub fn grid_key(spacing: f64) -> String {
    format!("g{}m", format_general(spacing))
}

/// Measurement path for an asset href.
pub fn measurement_path(href: &str, mode: PathMode) -> String {
    match mode {
        PathMode::Absolute => href.to_string(),
        PathMode::Relative => {
            // Query and fragment are dropped, so signed URLs yield the bare file name.
            let without_query = href.split(['?', '#']).next().unwrap_or(href);
            Path::new(without_query)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| href.to_string())
        }
    }
}

/// Group COG assets into grids and measurements.
///
/// Assets are visited in document order. Non-COG assets are skipped. The
/// first asset seen for a grid key defines that grid. Fails with [`TransformError::UnknownDefaultGrid`] when no asset
/// maps to `default_grid`.
pub fn consolidate(
    assets: &Assets,
    default_grid: &str,
    path_mode: PathMode,
) -> Result<Consolidated> {
    let mut grids: BTreeMap<String, GridDescriptor> = BTreeMap::new();
    let mut measurements = BTreeMap::new();

    for (name, asset) in assets.iter() {
        if !asset.is_cog() {
            debug!(
                asset = %name,
                media_type = ?asset.media_type,
                "Skipping non-COG asset"
            );
            continue;
        }

        let (shape, transform) = asset.raster_grid(name)?;
        let key = grid_key(transform.pixel_size_x());
        let is_default = key == default_grid;
        let grid_name = if is_default {
            DEFAULT_GRID_KEY.to_string()
        } else {
            key.clone()
        };

        grids
            .entry(grid_name)
            .or_insert(GridDescriptor { shape, transform });

        measurements.insert(
            name.to_string(),
            Measurement {
                path: measurement_path(&asset.href, path_mode),
                grid: (!is_default).then_some(key),
            },
        );
    }

    if !grids.contains_key(DEFAULT_GRID_KEY) {
        return Err(TransformError::UnknownDefaultGrid {
            key: default_grid.to_string(),
            available: grids.into_keys().collect(),
        });
    }

    debug!(
        grids = grids.len(),
        measurements = measurements.len(),
        "Consolidated asset grids"
    );

    Ok(Consolidated {
        grids,
        measurements,
    })
}
