//! Typed STAC item input.
//!
//! Only the subset of a STAC 1.0 item the transform reads is modelled.
//! Mission-specific properties are kept in [`ItemProperties::extra`] and
//! looked up by the mission profiles that need them.

use odc_common::{CrsCode, Geometry};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, TransformError};

/// Media type of cloud-optimized GeoTIFF assets.
pub const COG_MEDIA_TYPE: &str = "image/tiff; application=geotiff; profile=cloud-optimized";

/// A STAC item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StacItem {
    /// Item identifier
    pub id: String,
    /// Footprint in lon/lat
    #[serde(default)]
    pub geometry: Option<Geometry>,
    /// Item properties
    pub properties: ItemProperties,
    /// Assets keyed by name, in document order
    #[serde(default)]
    pub assets: Assets,
}

impl StacItem {
    /// Parse a single item from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a single item from a JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Named assets in the order the document lists them.
///
/// A repeated name replaces the earlier asset in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assets(Vec<(String, StacAsset)>);

impl Assets {
    pub fn get(&self, name: &str) -> Option<&StacAsset> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, asset)| asset)
    }

    /// Add or replace an asset.
    pub fn insert(&mut self, name: impl Into<String>, asset: StacAsset) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = asset,
            None => self.0.push((name, asset)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StacAsset)> {
        self.0.iter().map(|(name, asset)| (name.as_str(), asset))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, StacAsset)> for Assets {
    fn from_iter<I: IntoIterator<Item = (N, StacAsset)>>(iter: I) -> Self {
        let mut assets = Assets::default();
        for (name, asset) in iter {
            assets.insert(name, asset);
        }
        assets
    }
}

impl Serialize for Assets {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, asset) in &self.0 {
            map.serialize_entry(name, asset)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Assets {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct AssetsVisitor;

        impl<'de> Visitor<'de> for AssetsVisitor {
            type Value = Assets;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of STAC assets")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> std::result::Result<Assets, M::Error> {
                let mut assets = Assets::default();
                while let Some((name, asset)) = access.next_entry::<String, StacAsset>()? {
                    assets.insert(name, asset);
                }
                Ok(assets)
            }
        }

        deserializer.deserialize_map(AssetsVisitor)
    }
}

/// Extract the items of a STAC document.
///
/// Accepts a single `Feature` or a `FeatureCollection` of features.
pub fn items_from_document(document: Value) -> Result<Vec<StacItem>> {
    let doc_type = document
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match doc_type.as_str() {
        "Feature" => Ok(vec![StacItem::from_value(document)?]),
        "FeatureCollection" => match document.get("features") {
            Some(Value::Array(features)) => features
                .iter()
                .cloned()
                .map(StacItem::from_value)
                .collect(),
            _ => Err(TransformError::missing("features")),
        },
        "" => Err(TransformError::missing("type")),
        other => Err(TransformError::UnsupportedDocument(other.to_string())),
    }
}

/// Item properties.
///
/// Fields the transform always needs are typed; everything else lands in
/// `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constellation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,

    #[serde(rename = "eo:cloud_cover", default, skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<Number>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gsd: Option<Number>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruments: Option<Vec<String>>,

    #[serde(rename = "proj:epsg", default, skip_serializing_if = "Option::is_none")]
    pub epsg: Option<u32>,

    /// Mission-specific and unrecognized properties
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ItemProperties {
    /// Look up a mission-specific property.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key).filter(|v| !v.is_null())
    }

    /// Mission-specific property that must be present.
    pub fn require(&self, key: &str) -> Result<&Value> {
        self.get(key).ok_or_else(|| TransformError::missing(key))
    }

    /// Mission-specific property rendered as text.
    ///
    /// Strings are returned as-is, numbers and booleans in their JSON form.
    pub fn require_text(&self, key: &str) -> Result<String> {
        match self.require(key)? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(TransformError::invalid(
                key,
                format!("expected a scalar, got {}", other),
            )),
        }
    }

    /// The `platform` property.
    pub fn require_platform(&self) -> Result<&str> {
        self.platform
            .as_deref()
            .ok_or_else(|| TransformError::missing("platform"))
    }

    /// The `proj:epsg` property.
    pub fn require_epsg(&self) -> Result<u32> {
        self.epsg.ok_or_else(|| TransformError::missing("proj:epsg"))
    }
}

/// Properties every dataset document needs, validated once per item.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreProperties {
    /// Acquisition timestamp as given by the source
    pub datetime: String,
    pub cloud_cover: Number,
    pub gsd: Number,
    /// First entry of `instruments`
    pub instrument: String,
    pub platform: String,
    /// Native CRS from `proj:epsg`
    pub crs: CrsCode,
}

impl CoreProperties {
    /// Validate the always-required properties.
    pub fn from_properties(props: &ItemProperties) -> Result<Self> {
        let datetime = props
            .datetime
            .clone()
            .ok_or_else(|| TransformError::missing("datetime"))?;
        let cloud_cover = props
            .cloud_cover
            .clone()
            .ok_or_else(|| TransformError::missing("eo:cloud_cover"))?;
        let gsd = props
            .gsd
            .clone()
            .ok_or_else(|| TransformError::missing("gsd"))?;
        let instrument = props
            .instruments
            .as_ref()
            .ok_or_else(|| TransformError::missing("instruments"))?
            .first()
            .cloned()
            .ok_or_else(|| TransformError::missing("instruments[0]"))?;
        let platform = props.require_platform()?.to_string();
        let crs = CrsCode::from_epsg(props.require_epsg()?);

        Ok(Self {
            datetime,
            cloud_cover,
            gsd,
            instrument,
            platform,
            crs,
        })
    }
}

/// A STAC asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StacAsset {
    /// Media type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    /// Location of the asset
    pub href: String,

    /// Affine transform of the raster grid
    #[serde(rename = "proj:transform", default, skip_serializing_if = "Option::is_none")]
    pub proj_transform: Option<Vec<f64>>,

    /// Raster dimensions (rows, columns)
    #[serde(rename = "proj:shape", default, skip_serializing_if = "Option::is_none")]
    pub proj_shape: Option<[u64; 2]>,
}

impl StacAsset {
    /// Whether this asset is cloud-optimized GeoTIFF imagery.
    pub fn is_cog(&self) -> bool {
        self.media_type.as_deref() == Some(COG_MEDIA_TYPE)
    }

    /// The validated raster grid of this asset.
    ///
    /// `name` is only used to label errors.
    pub fn raster_grid(&self, name: &str) -> Result<([u64; 2], GeoTransform)> {
        let shape = self
            .proj_shape
            .ok_or_else(|| TransformError::missing(format!("assets.{}.proj:shape", name)))?;
        let transform = self
            .proj_transform
            .as_ref()
            .ok_or_else(|| TransformError::missing(format!("assets.{}.proj:transform", name)))?;
        let transform = GeoTransform::new(transform.clone())
            .map_err(|message| TransformError::invalid(format!("assets.{}.proj:transform", name), message))?;
        Ok((shape, transform))
    }
}

/// Affine pixel-to-CRS transform, `[a, b, c, d, e, f]` in rasterio order.
///
/// The nine-element form with a trailing `0, 0, 1` row is accepted and kept
/// as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoTransform(Vec<f64>);

impl GeoTransform {
    /// Validate a transform.
    pub fn new(values: Vec<f64>) -> std::result::Result<Self, String> {
        match values.len() {
            6 => {}
            9 if values[6..] == [0.0, 0.0, 1.0] => {}
            9 => return Err("last row of a 3x3 transform must be 0, 0, 1".to_string()),
            n => return Err(format!("expected 6 or 9 elements, got {}", n)),
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err("transform contains non-finite values".to_string());
        }
        if values[0] == 0.0 {
            return Err("pixel width is zero".to_string());
        }
        Ok(Self(values))
    }

    /// Pixel width along x in CRS units.
    pub fn pixel_size_x(&self) -> f64 {
        self.0[0]
    }

    /// The raw coefficients.
    pub fn values(&self) -> &[f64] {
        &self.0
    }
}
