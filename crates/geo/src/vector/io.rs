//! Vector dataset reading (GeoJSON and ESRI shapefiles).
//!
//! Features without a polygon geometry are skipped. The GeoJSON coordinate system is taken from the
//! (deprecated but still widely written) `crs` member, WGS84 is assumed when it is absent.

use std::path::Path;

use geo_types::{Geometry, MultiPolygon};
use geozero::{ToGeo, geojson::GeoJson};
use serde_json::Value;

use crate::{Error, Result, VectorFeatureSet, crs::epsg};

mod shp;

pub use shp::read_shapefile;

/// Reads the dataset with the reader matching the file extension
pub fn read(path: impl AsRef<Path>) -> Result<VectorFeatureSet> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "geojson" | "json" => read_geojson(path),
        "shp" => read_shapefile(path),
        _ => Err(Error::InvalidArgument(format!("Unsupported vector format: {}", path.display()))),
    }
}

pub fn read_geojson(path: impl AsRef<Path>) -> Result<VectorFeatureSet> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::SourceNotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path)?;
    let features = parse_geojson(&contents)?;
    log::debug!("Read {} features from {}", features.len(), path.display());

    let source = path.file_name().map(|name| name.to_string_lossy().to_string()).unwrap_or_default();
    Ok(features.with_source(source))
}

pub fn parse_geojson(geojson: &str) -> Result<VectorFeatureSet> {
    let root: Value = serde_json::from_str(geojson)?;
    let projection = crs_from_geojson(&root).unwrap_or_else(|| epsg::WGS84.to_string());

    let mut geometries = Vec::new();
    match root.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            let features = root
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| Error::InvalidArgument("FeatureCollection without features".into()))?;

            for feature in features {
                if let Some(geom) = feature.get("geometry") {
                    add_geometry(geom, &mut geometries)?;
                }
            }
        }
        Some("Feature") => {
            if let Some(geom) = root.get("geometry") {
                add_geometry(geom, &mut geometries)?;
            }
        }
        Some(_) => add_geometry(&root, &mut geometries)?,
        None => return Err(Error::InvalidArgument("Not a GeoJSON object, 'type' is missing".into())),
    }

    Ok(VectorFeatureSet::new(projection, geometries))
}

/// Supports `EPSG:32718` and `urn:ogc:def:crs:EPSG::32718` style names
fn crs_from_geojson(root: &Value) -> Option<String> {
    let name = root.get("crs")?.get("properties")?.get("name")?.as_str()?;
    if name.ends_with("CRS84") {
        return Some(epsg::WGS84.to_string());
    }

    let code = name.rsplit(':').next()?.parse::<u16>().ok()?;
    Some(format!("EPSG:{code}"))
}

fn add_geometry(geom: &Value, geometries: &mut Vec<MultiPolygon<f64>>) -> Result<()> {
    if geom.is_null() {
        return Ok(());
    }

    let geom_json = serde_json::to_string(geom)?;
    collect_polygons(GeoJson(&geom_json).to_geo()?, geometries);
    Ok(())
}

fn collect_polygons(geom: Geometry<f64>, geometries: &mut Vec<MultiPolygon<f64>>) {
    match geom {
        Geometry::Polygon(polygon) => geometries.push(MultiPolygon::new(vec![polygon])),
        Geometry::MultiPolygon(multi_polygon) => geometries.push(multi_polygon),
        Geometry::GeometryCollection(collection) => {
            for geom in collection {
                collect_polygons(geom, geometries);
            }
        }
        _ => log::debug!("Skipping non polygon geometry"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEATURE_COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:EPSG::32718" } },
        "features": [
            { "type": "Feature", "properties": { "id": 1 }, "geometry": {
                "type": "Polygon", "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]] } },
            { "type": "Feature", "properties": { "id": 2 }, "geometry": {
                "type": "MultiPolygon", "coordinates": [[[[20, 20], [30, 20], [30, 30], [20, 20]]], [[[40, 40], [50, 40], [50, 50], [40, 40]]]] } },
            { "type": "Feature", "properties": { "id": 3 }, "geometry": { "type": "Point", "coordinates": [5, 5] } },
            { "type": "Feature", "properties": { "id": 4 }, "geometry": null }
        ]
    }"#;

    #[test]
    fn parse_feature_collection() -> Result<()> {
        let features = parse_geojson(FEATURE_COLLECTION)?;
        assert_eq!(features.projection(), "EPSG:32718");
        assert_eq!(features.len(), 2);
        assert_eq!(features.geometries()[1].0.len(), 2);
        assert_eq!(features.bounding_box(), Some(crate::Rect::from_bounds(0.0, 0.0, 50.0, 50.0)));
        Ok(())
    }

    #[test]
    fn default_crs_is_wgs84() -> Result<()> {
        let features = parse_geojson(r#"{ "type": "Polygon", "coordinates": [[[-73.3, -39.9], [-73.2, -39.9], [-73.2, -39.8], [-73.3, -39.9]]] }"#)?;
        assert_eq!(features.projection(), "EPSG:4326");
        assert_eq!(features.len(), 1);
        Ok(())
    }

    #[test]
    fn read_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("FireScar_CL-LR_20200115.geojson");
        std::fs::write(&path, FEATURE_COLLECTION)?;

        let features = read_geojson(&path)?;
        assert_eq!(features.source(), Some("FireScar_CL-LR_20200115.geojson"));
        assert!(matches!(read_geojson(dir.path().join("missing.geojson")), Err(Error::SourceNotFound(_))));
        Ok(())
    }

    #[test]
    fn read_by_extension() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("comuna.GeoJSON");
        std::fs::write(&path, FEATURE_COLLECTION)?;
        assert_eq!(read(&path)?.len(), 2);

        let unsupported = dir.path().join("comuna.kml");
        std::fs::write(&unsupported, "")?;
        assert!(matches!(read(&unsupported), Err(Error::InvalidArgument(_))));
        Ok(())
    }

    #[test]
    fn invalid_json() {
        assert!(parse_geojson("{ not json").is_err());
        assert!(parse_geojson(r#"{ "features": [] }"#).is_err());
    }
}
