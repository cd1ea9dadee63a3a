//! ESRI shapefile reading, the coordinate system is read from the `.prj` file next to the `.shp` file.

use std::path::Path;

use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::{PolygonRing, Shape};

use crate::{Error, Result, SpatialReference, VectorFeatureSet, crs::epsg};

pub fn read_shapefile(path: impl AsRef<Path>) -> Result<VectorFeatureSet> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::SourceNotFound(path.to_path_buf()));
    }

    let projection = read_projection(&path.with_extension("prj"))?;

    let mut geometries = Vec::new();
    for shape in shapefile::read_shapes(path)? {
        let geometry = match shape {
            Shape::Polygon(polygon) => to_multi_polygon(polygon.rings(), |p| Coord { x: p.x, y: p.y }),
            Shape::PolygonM(polygon) => to_multi_polygon(polygon.rings(), |p| Coord { x: p.x, y: p.y }),
            Shape::PolygonZ(polygon) => to_multi_polygon(polygon.rings(), |p| Coord { x: p.x, y: p.y }),
            Shape::NullShape => continue,
            _ => {
                log::debug!("Skipping non polygon shape");
                continue;
            }
        };

        if !geometry.0.is_empty() {
            geometries.push(geometry);
        }
    }

    log::debug!("Read {} features from {}", geometries.len(), path.display());

    let source = path.file_name().map(|name| name.to_string_lossy().to_string()).unwrap_or_default();
    Ok(VectorFeatureSet::new(projection, geometries).with_source(source))
}

/// WGS84 is assumed when there is no `.prj` file
fn read_projection(prj: &Path) -> Result<String> {
    if !prj.exists() {
        log::warn!("No projection file {}, assuming {}", prj.display(), epsg::WGS84);
        return Ok(epsg::WGS84.to_string());
    }

    let wkt = std::fs::read_to_string(prj)?;
    Ok(SpatialReference::from_wkt(wkt.trim())?.definition().to_string())
}

/// Inner rings belong to the outer ring that precedes them
fn to_multi_polygon<P>(rings: &[PolygonRing<P>], to_coord: impl Fn(&P) -> Coord<f64>) -> MultiPolygon<f64> {
    let mut polygons: Vec<Polygon<f64>> = Vec::new();
    for ring in rings {
        let (outer, points) = match ring {
            PolygonRing::Outer(points) => (true, points),
            PolygonRing::Inner(points) => (false, points),
        };

        let line: LineString<f64> = points.iter().map(&to_coord).collect();
        if outer {
            polygons.push(Polygon::new(line, Vec::new()));
        } else if let Some(polygon) = polygons.last_mut() {
            polygon.interiors_push(line);
        } else {
            log::warn!("Skipping inner ring without outer ring");
        }
    }

    MultiPolygon::new(polygons)
}
