//! Common test fixtures for STAC → ODC tests.
//!
//! This module provides pre-defined test data that represents common
//! scenarios: Sentinel-2 L2A items, items from unknown missions, and
//! valid/invalid footprints.

/// Footprint geometries in lon/lat.
pub mod footprint {
    use odc_common::Geometry;

    /// Axis-aligned square with its lower-left corner at (lon, lat).
    pub fn square(lon: f64, lat: f64, size: f64) -> Geometry {
        Geometry::polygon(vec![vec![
            [lon, lat],
            [lon + size, lat],
            [lon + size, lat + size],
            [lon, lat + size],
            [lon, lat],
        ]])
    }

    /// Self-intersecting "bow tie" ring with non-zero signed area.
    pub fn bowtie(lon: f64, lat: f64, size: f64) -> Geometry {
        Geometry::polygon(vec![vec![
            [lon, lat],
            [lon + size, lat + size],
            [lon + size, lat],
            [lon, lat + size / 2.0],
            [lon, lat],
        ]])
    }

    /// Ring whose vertices are all collinear.
    pub fn sliver(lon: f64, lat: f64, size: f64) -> Geometry {
        Geometry::polygon(vec![vec![
            [lon, lat],
            [lon + size, lat],
            [lon + 2.0 * size, lat],
            [lon, lat],
        ]])
    }

    /// Square with a square hole in its middle.
    pub fn square_with_hole(lon: f64, lat: f64, size: f64) -> Geometry {
        let q = size / 4.0;
        Geometry::polygon(vec![
            vec![
                [lon, lat],
                [lon + size, lat],
                [lon + size, lat + size],
                [lon, lat + size],
                [lon, lat],
            ],
            vec![
                [lon + q, lat + q],
                [lon + q, lat + 3.0 * q],
                [lon + 3.0 * q, lat + 3.0 * q],
                [lon + 3.0 * q, lat + q],
                [lon + q, lat + q],
            ],
        ])
    }
}

/// STAC item documents as JSON values.
pub mod stac {
    use serde_json::{json, Value};

    /// Media type of cloud-optimized GeoTIFF assets.
    pub const COG_MEDIA_TYPE: &str = "image/tiff; application=geotiff; profile=cloud-optimized";

    /// Base href for fixture assets.
    pub const ASSET_BASE: &str =
        "https://sentinel-cogs.s3.us-west-2.amazonaws.com/sentinel-s2-l2a-cogs/33/U/XV/2021/4/S2B_33UXV_20210412_0_L2A";

    /// Sentinel-2 product id used by [`sentinel2_item`].
    pub const S2_PRODUCT_ID: &str = "S2B_MSIL2A_20210412T100029_N0300_R122_T33UXV_20210412T124012";

    /// A COG asset on a square grid with the given pixel spacing.
    pub fn cog_asset(name: &str, spacing: f64, pixels: u64) -> Value {
        json!({
            "type": COG_MEDIA_TYPE,
            "href": format!("{}/{}.tif", ASSET_BASE, name),
            "proj:shape": [pixels, pixels],
            "proj:transform": [spacing, 0.0, 600000.0, 0.0, -spacing, 5600040.0]
        })
    }

    /// Lon/lat footprint of tile 33UXV.
    pub fn s2_footprint() -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[
                [16.3861, 49.6206],
                [17.9040, 49.6101],
                [17.9287, 50.5966],
                [16.3851, 50.6075],
                [16.3861, 49.6206]
            ]]
        })
    }

    /// A Sentinel-2 L2A item with two 10 m bands, one 20 m band, and
    /// two non-COG assets.
    pub fn sentinel2_item(id: &str) -> Value {
        json!({
            "type": "Feature",
            "stac_version": "1.0.0",
            "id": id,
            "geometry": s2_footprint(),
            "properties": {
                "datetime": "2021-04-12T10:07:03.123000+00:00",
                "platform": "sentinel-2b",
                "constellation": "sentinel-2",
                "instruments": ["msi"],
                "gsd": 10,
                "eo:cloud_cover": 4.87,
                "proj:epsg": 32633,
                "sentinel:utm_zone": 33,
                "sentinel:latitude_band": "U",
                "sentinel:grid_square": "XV",
                "sentinel:product_id": S2_PRODUCT_ID
            },
            "assets": {
                "B02": cog_asset("B02", 10.0, 10980),
                "B03": cog_asset("B03", 10.0, 10980),
                "B11": cog_asset("B11", 20.0, 5490),
                "thumbnail": {
                    "type": "image/jpeg",
                    "href": format!("{}/preview.jpg", ASSET_BASE)
                },
                "info": {
                    "type": "application/json",
                    "href": format!("{}/tileInfo.json", ASSET_BASE)
                }
            }
        })
    }

    /// An item whose constellation has no registered profile.
    pub fn generic_item(id: &str, constellation: &str, platform: &str) -> Value {
        let mut item = sentinel2_item(id);
        item["properties"] = json!({
            "datetime": "2022-06-01T00:00:00Z",
            "platform": platform,
            "constellation": constellation,
            "instruments": ["oli", "tirs"],
            "gsd": 30,
            "eo:cloud_cover": 12,
            "proj:epsg": 32633
        });
        item["assets"] = json!({
            "red": cog_asset("red", 10.0, 10980),
            "nir": cog_asset("nir", 10.0, 10980)
        });
        item
    }

    /// Replace (or insert) a property on an item.
    pub fn with_property(mut item: Value, key: &str, value: Value) -> Value {
        item["properties"][key] = value;
        item
    }

    /// Remove a property from an item.
    pub fn without_property(mut item: Value, key: &str) -> Value {
        if let Some(props) = item["properties"].as_object_mut() {
            props.remove(key);
        }
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel2_item_shape() {
        let item = stac::sentinel2_item("S2A_item_1");
        assert_eq!(item["id"], "S2A_item_1");
        assert_eq!(item["assets"].as_object().unwrap().len(), 5);
        assert_eq!(item["assets"]["B11"]["proj:transform"][0], 20.0);
    }

    #[test]
    fn test_with_and_without_property() {
        let item = stac::with_property(stac::sentinel2_item("x"), "gsd", serde_json::json!(20));
        assert_eq!(item["properties"]["gsd"], 20);
        let item = stac::without_property(item, "gsd");
        assert!(item["properties"].get("gsd").is_none());
    }

    #[test]
    fn test_footprints_have_closed_rings() {
        for geometry in [
            footprint::square(0.0, 0.0, 1.0),
            footprint::bowtie(0.0, 0.0, 1.0),
            footprint::sliver(0.0, 0.0, 1.0),
        ] {
            match geometry {
                odc_common::Geometry::Polygon { coordinates } => {
                    assert_eq!(coordinates[0].first(), coordinates[0].last());
                }
                other => panic!("unexpected {}", other.type_name()),
            }
        }
    }
}
