//! Spatial reference system handling and coordinate transformations.

use proj4rs::Proj;
use proj4rs::proj::ProjType;
use proj4rs::transform::transform;
use proj4wkt::wkt_to_projstring;

use crate::crs::Epsg;
use crate::crs::epsg;
use crate::{Error, Point, Result};

#[derive(Debug, Clone)]
pub struct SpatialReference {
    srs: Proj,
    epsg: Option<Epsg>,
    definition: String,
}

impl SpatialReference {
    pub fn from_epsg(epsg: Epsg) -> Result<Self> {
        let proj_str = crs_definitions::from_code(epsg.code())
            .map(|def| def.proj4.to_string())
            .ok_or_else(|| Error::Runtime(format!("Failed to generate Proj4 string for EPSG code {epsg}")))?;

        Ok(Self {
            srs: Proj::from_proj_string(&proj_str)?,
            epsg: Some(epsg),
            definition: epsg.to_string(),
        })
    }

    /// Accepts `EPSG:<code>`, `WGS84`, a WKT string or a proj string
    pub fn from_definition(def: &str) -> Result<Self> {
        let def = def.trim();
        if def.is_empty() {
            return Err(Error::InvalidArgument("Empty projection definition".into()));
        }

        if def.eq_ignore_ascii_case("WGS84") {
            return Self::from_epsg(epsg::WGS84);
        }

        if let Ok(epsg) = def.parse::<Epsg>() {
            return Self::from_epsg(epsg);
        }

        if is_wkt_string(def) {
            return Self::from_wkt(def);
        }

        Ok(Self {
            srs: Proj::from_proj_string(def)?,
            epsg: None,
            definition: def.to_string(),
        })
    }

    /// The EPSG authority of the WKT is used when present, it gives results closer to osgeo/proj
    pub fn from_wkt(wkt: &str) -> Result<Self> {
        if let Some(epsg) = wkt_epsg(wkt) {
            return Self::from_epsg(epsg);
        }

        let proj_str =
            wkt_to_projstring(wkt).map_err(|e| Error::InvalidArgument(format!("Failed to parse WKT string ({e})")))?;

        Ok(Self {
            srs: Proj::from_proj_string(&proj_str)?,
            epsg: None,
            definition: proj_str,
        })
    }

    pub fn is_geographic(&self) -> bool {
        self.srs.projection_type() == ProjType::Latlong
    }

    pub fn is_projected(&self) -> bool {
        !self.is_geographic()
    }

    pub fn epsg(&self) -> Option<Epsg> {
        self.epsg
    }

    /// The definition this reference was created from, `EPSG:<code>` when created from an EPSG code
    pub fn definition(&self) -> &str {
        &self.definition
    }

    fn proj(&self) -> &Proj {
        &self.srs
    }
}

const WKT_ROOTS: [&str; 4] = ["PROJCS[", "GEOGCS[", "PROJCRS[", "GEOGCRS["];

fn is_wkt_string(s: &str) -> bool {
    WKT_ROOTS.iter().any(|root| s.starts_with(root))
}

fn wkt_epsg(wkt: &str) -> Option<Epsg> {
    let parse_code = |code: &str| code.parse::<u16>().ok().map(Epsg::from);

    let builder = proj4wkt::Builder;
    let node = builder.parse(wkt).ok()?;
    match &node {
        proj4wkt::builder::Node::PROJCRS(crs) => crs.projection.authority.as_ref().and_then(|auth| parse_code(&auth.code)),
        proj4wkt::builder::Node::GEOGCRS(crs) => crs.authority.as_ref().and_then(|auth| parse_code(&auth.code)),
        _ => None,
    }
}

/// Transforms points between two spatial references.
/// Geographic coordinates are expressed in degrees (x = longitude, y = latitude) on both sides.
pub struct CoordinateTransformer {
    source: SpatialReference,
    target: SpatialReference,
    identity: bool,
}

impl CoordinateTransformer {
    pub fn new(source_srs: &str, target_srs: &str) -> Result<Self> {
        Ok(Self::from_references(
            SpatialReference::from_definition(source_srs)?,
            SpatialReference::from_definition(target_srs)?,
        ))
    }

    pub fn from_epsg(source_epsg: Epsg, target_epsg: Epsg) -> Result<Self> {
        Ok(Self::from_references(
            SpatialReference::from_epsg(source_epsg)?,
            SpatialReference::from_epsg(target_epsg)?,
        ))
    }

    pub fn from_references(source: SpatialReference, target: SpatialReference) -> Self {
        let identity = match (source.epsg(), target.epsg()) {
            (Some(src), Some(dst)) => src == dst,
            _ => source.definition() == target.definition(),
        };

        CoordinateTransformer { source, target, identity }
    }

    /// True when source and target are the same reference, points pass through unchanged
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    pub fn transform_point(&self, point: Point) -> Result<Point> {
        let mut p = point;
        self.transform_point_in_place(&mut p)?;
        Ok(p)
    }

    pub fn transform_point_in_place(&self, point: &mut Point) -> Result<()> {
        if self.identity {
            return Ok(());
        }

        if self.source.is_geographic() {
            *point = point.to_radians();
        }

        transform(self.source.proj(), self.target.proj(), point)?;

        if self.target.is_geographic() {
            // proj4rs works in radians for geographic systems
            *point = point.to_degrees();
        }

        Ok(())
    }

    pub fn transform_points_in_place(&self, points: &mut [Point]) -> Result<()> {
        for point in points.iter_mut() {
            self.transform_point_in_place(point)?;
        }
        Ok(())
    }

    pub fn source(&self) -> &SpatialReference {
        &self.source
    }

    pub fn target(&self) -> &SpatialReference {
        &self.target
    }

    pub fn source_srs(&self) -> &str {
        self.source.definition()
    }

    pub fn target_srs(&self) -> &str {
        self.target.definition()
    }
}
