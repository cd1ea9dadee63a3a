use chrono::NaiveDate;
use geo_types::MultiPolygon;

use crate::{CoordinateTransformer, Rect, Result, SpatialReference};

use super::geometry;

/// Polygon features in a single coordinate system, optionally tagged with the date of the dataset they originate from.
/// Reprojection and filtering produce new feature sets, the original is never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorFeatureSet {
    geometries: Vec<MultiPolygon<f64>>,
    projection: String,
    timestamp: Option<NaiveDate>,
    source: Option<String>,
}

impl VectorFeatureSet {
    pub fn new(projection: impl Into<String>, geometries: Vec<MultiPolygon<f64>>) -> Self {
        VectorFeatureSet {
            geometries,
            projection: projection.into(),
            timestamp: None,
            source: None,
        }
    }

    pub fn empty(projection: impl Into<String>) -> Self {
        Self::new(projection, Vec::new())
    }

    pub fn with_timestamp(mut self, timestamp: NaiveDate) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Identifier of the dataset (e.g. the file name)
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn geometries(&self) -> &[MultiPolygon<f64>] {
        &self.geometries
    }

    pub fn projection(&self) -> &str {
        &self.projection
    }

    pub fn timestamp(&self) -> Option<NaiveDate> {
        self.timestamp
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    pub fn bounding_box(&self) -> Option<Rect> {
        self.geometries
            .iter()
            .filter_map(geometry::bounding_box)
            .reduce(|acc, bbox| acc.union(&bbox))
    }

    /// A copy of the feature set in the `target` coordinate system
    pub fn reprojected(&self, target: &str) -> Result<VectorFeatureSet> {
        let coord_trans = CoordinateTransformer::new(&self.projection, target)?;
        let geometries = if coord_trans.is_identity() {
            self.geometries.clone()
        } else {
            self.geometries
                .iter()
                .map(|geom| geometry::transform(geom, &coord_trans))
                .collect::<Result<Vec<_>>>()?
        };

        Ok(VectorFeatureSet {
            geometries,
            projection: target.to_string(),
            timestamp: self.timestamp,
            source: self.source.clone(),
        })
    }

    pub fn has_projection(&self, projection: &str) -> bool {
        match (SpatialReference::from_definition(&self.projection), SpatialReference::from_definition(projection)) {
            (Ok(lhs), Ok(rhs)) => match (lhs.epsg(), rhs.epsg()) {
                (Some(l), Some(r)) => l == r,
                _ => lhs.definition() == rhs.definition(),
            },
            _ => self.projection == projection,
        }
    }

    /// True when at least one feature intersects the area
    pub fn intersects(&self, area: &Rect) -> bool {
        self.geometries.iter().any(|geom| geometry::intersects_rect(geom, area))
    }

    /// The features that intersect the area
    pub fn intersecting(&self, area: &Rect) -> VectorFeatureSet {
        VectorFeatureSet {
            geometries: self
                .geometries
                .iter()
                .filter(|geom| geometry::intersects_rect(geom, area))
                .cloned()
                .collect(),
            projection: self.projection.clone(),
            timestamp: self.timestamp,
            source: self.source.clone(),
        }
    }

    /// Concatenates the features of several sets, the sets must share the coordinate system of the first set
    pub fn merged<'a>(sets: impl IntoIterator<Item = &'a VectorFeatureSet>) -> Option<VectorFeatureSet> {
        let mut iter = sets.into_iter();
        let first = iter.next()?;

        let mut merged = VectorFeatureSet::new(first.projection.clone(), first.geometries.clone());
        for set in iter {
            debug_assert!(set.has_projection(&first.projection));
            merged.geometries.extend(set.geometries.iter().cloned());
        }

        Some(merged)
    }
}
