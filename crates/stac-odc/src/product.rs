//! Product identity resolution.
//!
//! Every item resolves to a [`ProductIdentity`]. Items from a registered
//! constellation go through that mission's [`MissionProfile`]; everything
//! else falls back to [`GenericProfile`], which labels the dataset with the
//! item id and names the product after the platform.

use std::collections::HashMap;
use tracing::debug;

use crate::error::Result;
use crate::item::StacItem;

/// Resolved product identity of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductIdentity {
    /// Human-readable dataset label
    pub label: String,
    /// Canonical product name (lower-cased)
    pub name: String,
    /// Mission tiling code, e.g. `33UXV`
    pub region_code: Option<String>,
}

/// Mission-specific mapping from item metadata to product identity.
pub trait MissionProfile: Send + Sync {
    /// Value of the `constellation` property this profile handles.
    fn constellation(&self) -> &str;

    /// Dataset label.
    fn resolve_label(&self, item: &StacItem) -> Result<String>;

    /// Product name, before lower-casing.
    fn resolve_name(&self, item: &StacItem) -> Result<String>;

    /// Region code, if the mission has a tiling scheme.
    fn resolve_region_code(&self, item: &StacItem) -> Result<Option<String>>;

    /// Resolve all three parts.
    fn resolve(&self, item: &StacItem) -> Result<ProductIdentity> {
        Ok(ProductIdentity {
            label: self.resolve_label(item)?,
            name: self.resolve_name(item)?.to_lowercase(),
            region_code: self.resolve_region_code(item)?,
        })
    }
}

/// Fallback for items from unknown missions.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericProfile;

impl MissionProfile for GenericProfile {
    fn constellation(&self) -> &str {
        "*"
    }

    fn resolve_label(&self, item: &StacItem) -> Result<String> {
        Ok(item.id.clone())
    }

    fn resolve_name(&self, item: &StacItem) -> Result<String> {
        Ok(item.properties.require_platform()?.to_string())
    }

    fn resolve_region_code(&self, _item: &StacItem) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Sentinel-2 Level-2A items from the `sentinel:` STAC extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sentinel2Profile;

impl Sentinel2Profile {
    /// Canonical product name for Sentinel-2 surface reflectance.
    pub const PRODUCT_NAME: &'static str = "s2_l2a";
}

impl MissionProfile for Sentinel2Profile {
    fn constellation(&self) -> &str {
        "sentinel-2"
    }

    fn resolve_label(&self, item: &StacItem) -> Result<String> {
        item.properties.require_text("sentinel:product_id")
    }

    fn resolve_name(&self, _item: &StacItem) -> Result<String> {
        Ok(Self::PRODUCT_NAME.to_string())
    }

    /// UTM zone (last two digits of the EPSG code), latitude band, grid square.
    fn resolve_region_code(&self, item: &StacItem) -> Result<Option<String>> {
        let props = &item.properties;
        let epsg = props.require_epsg()?.to_string();
        let zone = &epsg[epsg.len().saturating_sub(2)..];
        let latitude_band = props.require_text("sentinel:latitude_band")?;
        let grid_square = props.require_text("sentinel:grid_square")?;

        Ok(Some(format!("{}{}{}", zone, latitude_band, grid_square)))
    }
}

/// Registry of mission profiles keyed by constellation.
pub struct ProfileRegistry {
    profiles: HashMap<String, Box<dyn MissionProfile>>,
    fallback: Box<dyn MissionProfile>,
}

impl ProfileRegistry {
    /// A registry with no mission profiles; every item uses the fallback.
    pub fn empty() -> Self {
        Self {
            profiles: HashMap::new(),
            fallback: Box::new(GenericProfile),
        }
    }

    /// A registry with every known mission profile.
    pub fn with_known_missions() -> Self {
        let mut registry = Self::empty();
        registry.register(Sentinel2Profile);
        registry
    }

    /// Add (or replace) a mission profile.
    pub fn register<P: MissionProfile + 'static>(&mut self, profile: P) -> &mut Self {
        self.profiles
            .insert(profile.constellation().to_string(), Box::new(profile));
        self
    }

    /// Constellations with a registered profile, sorted.
    pub fn constellations(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Profile that handles `item`.
    pub fn profile_for(&self, item: &StacItem) -> &dyn MissionProfile {
        item.properties
            .constellation
            .as_deref()
            .and_then(|c| self.profiles.get(c))
            .map(Box::as_ref)
            .unwrap_or(self.fallback.as_ref())
    }

    /// Resolve the product identity of an item.
    pub fn resolve(&self, item: &StacItem) -> Result<ProductIdentity> {
        let profile = self.profile_for(item);
        let identity = profile.resolve(item)?;
        debug!(
            item = %item.id,
            profile = profile.constellation(),
            label = %identity.label,
            product = %identity.name,
            region_code = ?identity.region_code,
            "Resolved product identity"
        );
        Ok(identity)
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::with_known_missions()
    }
}

impl std::fmt::Debug for ProfileRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileRegistry")
            .field("constellations", &self.constellations())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use serde_json::json;

    fn item(properties: serde_json::Value) -> StacItem {
        StacItem::from_value(json!({
            "id": "S2A_item_1",
            "properties": properties,
            "assets": {}
        }))
        .unwrap()
    }

    fn s2_properties() -> serde_json::Value {
        json!({
            "constellation": "sentinel-2",
            "platform": "Sentinel-2A",
            "proj:epsg": 32633,
            "sentinel:latitude_band": "U",
            "sentinel:grid_square": "XV",
            "sentinel:product_id": "S2A_MSIL2A_20210412T100029_N0300_R122_T33UXV"
        })
    }

    #[test]
    fn test_sentinel2_identity() {
        let registry = ProfileRegistry::default();
        let identity = registry.resolve(&item(s2_properties())).unwrap();
        assert_eq!(identity.label, "S2A_MSIL2A_20210412T100029_N0300_R122_T33UXV");
        assert_eq!(identity.name, "s2_l2a");
        assert_eq!(identity.region_code.as_deref(), Some("33UXV"));
    }

    #[test]
    fn test_sentinel2_southern_zone() {
        let mut props = s2_properties();
        props["proj:epsg"] = json!(32755);
        props["sentinel:latitude_band"] = json!("H");
        props["sentinel:grid_square"] = json!("CV");
        let identity = ProfileRegistry::default().resolve(&item(props)).unwrap();
        assert_eq!(identity.region_code.as_deref(), Some("55HCV"));
    }

    #[test]
    fn test_sentinel2_missing_field() {
        let mut props = s2_properties();
        props.as_object_mut().unwrap().remove("sentinel:grid_square");
        let result = ProfileRegistry::default().resolve(&item(props));
        assert!(matches!(
            result,
            Err(TransformError::MissingField(f)) if f == "sentinel:grid_square"
        ));
    }

    #[test]
    fn test_unknown_constellation_falls_back() {
        let identity = ProfileRegistry::default()
            .resolve(&item(json!({"constellation": "landsat-8", "platform": "LANDSAT_8"})))
            .unwrap();
        assert_eq!(identity.label, "S2A_item_1");
        assert_eq!(identity.name, "landsat_8");
        assert_eq!(identity.region_code, None);
    }

    #[test]
    fn test_missing_constellation_falls_back() {
        let identity = ProfileRegistry::default()
            .resolve(&item(json!({"platform": "Planet"})))
            .unwrap();
        assert_eq!(identity.name, "planet");
    }

    #[test]
    fn test_fallback_requires_platform() {
        let result = ProfileRegistry::default().resolve(&item(json!({"constellation": "x"})));
        assert!(matches!(result, Err(TransformError::MissingField(f)) if f == "platform"));
    }

    #[test]
    fn test_empty_registry_ignores_sentinel2() {
        let identity = ProfileRegistry::empty().resolve(&item(s2_properties())).unwrap();
        assert_eq!(identity.label, "S2A_item_1");
        assert_eq!(identity.name, "sentinel-2a");
    }

    struct TestMission;

    impl MissionProfile for TestMission {
        fn constellation(&self) -> &str {
            "test-sat"
        }
        fn resolve_label(&self, item: &StacItem) -> Result<String> {
            Ok(format!("TEST_{}", item.id))
        }
        fn resolve_name(&self, _item: &StacItem) -> Result<String> {
            Ok("TEST_L1".to_string())
        }
        fn resolve_region_code(&self, _item: &StacItem) -> Result<Option<String>> {
            Ok(Some("R1".to_string()))
        }
    }

    #[test]
    fn test_register_new_mission() {
        let mut registry = ProfileRegistry::default();
        registry.register(TestMission);
        assert_eq!(registry.constellations(), vec!["sentinel-2", "test-sat"]);

        let identity = registry
            .resolve(&item(json!({"constellation": "test-sat", "platform": "p"})))
            .unwrap();
        assert_eq!(identity.label, "TEST_S2A_item_1");
        assert_eq!(identity.name, "test_l1");
        assert_eq!(identity.region_code.as_deref(), Some("R1"));
    }
}
