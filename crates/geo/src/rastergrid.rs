use std::path::Path;

use approx::RelativeEq;

use crate::crs::{Epsg, epsg};
use crate::raster::{algo, io};
use crate::{Cell, CoordinateTransformer, Error, GeoTransform, LatLonBounds, Point, RasterSize, Rect, Result, SpatialReference};

const TRANSFORM_TOLERANCE: f64 = 1e-9;

/// The full geometric description of a raster: coordinate system, affine transform, dimensions and nodata sentinel.
/// Bands that are combined cell by cell must share the same grid.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RasterGrid {
    projection: String,
    size: RasterSize,
    geo_transform: GeoTransform,
    nodata: Option<f64>,
}

impl RasterGrid {
    pub fn new(projection: impl Into<String>, size: RasterSize, geo_transform: GeoTransform, nodata: Option<f64>) -> Self {
        RasterGrid {
            projection: projection.into(),
            size,
            geo_transform,
            nodata,
        }
    }

    /// Resolves the reference grid from the georeferencing of a raster file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        io::read_grid(path.as_ref())
    }

    /// North up grid of `size` cells that exactly covers `bounds`
    pub fn from_bounds(projection: impl Into<String>, bounds: &Rect, size: RasterSize, nodata: Option<f64>) -> Result<Self> {
        if size.is_empty() {
            return Err(Error::InvalidArgument(format!("Grid size can not be empty: {size}")));
        }

        if bounds.is_empty() {
            return Err(Error::InvalidArgument("Grid bounds can not be empty".into()));
        }

        let cell_size_x = bounds.width() / size.cols as f64;
        let cell_size_y = -bounds.height() / size.rows as f64;

        Ok(RasterGrid::new(
            projection,
            size,
            GeoTransform::from_top_left_and_cell_size(bounds.top_left(), cell_size_x, cell_size_y),
            nodata,
        ))
    }

    pub fn projection(&self) -> &str {
        &self.projection
    }

    pub fn size(&self) -> RasterSize {
        self.size
    }

    pub fn rows(&self) -> usize {
        self.size.rows
    }

    pub fn columns(&self) -> usize {
        self.size.cols
    }

    pub fn geo_transform(&self) -> GeoTransform {
        self.geo_transform
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    pub fn with_nodata(mut self, nodata: Option<f64>) -> Self {
        self.nodata = nodata;
        self
    }

    pub fn cell_size_x(&self) -> f64 {
        self.geo_transform.cell_size_x()
    }

    pub fn cell_size_y(&self) -> f64 {
        self.geo_transform.cell_size_y()
    }

    pub fn top_left(&self) -> Point {
        self.geo_transform.top_left()
    }

    pub fn spatial_reference(&self) -> Result<SpatialReference> {
        SpatialReference::from_definition(&self.projection)
    }

    pub fn epsg(&self) -> Option<Epsg> {
        self.projection.parse().ok()
    }

    /// Grids without a usable projection are considered projected
    pub fn is_geographic(&self) -> bool {
        self.spatial_reference().map(|srs| srs.is_geographic()).unwrap_or(false)
    }

    /// World coordinate of the center of the cell
    pub fn cell_center(&self, cell: Cell) -> Point {
        self.geo_transform.apply(cell.col as f64 + 0.5, cell.row as f64 + 0.5)
    }

    /// Fractional pixel position (col, row) of a world coordinate
    pub fn pixel_position(&self, point: Point) -> Point {
        let gt = self.geo_transform.coefficients();
        if self.geo_transform.is_north_up() {
            return Point::new((point.x() - gt[0]) / gt[1], (point.y() - gt[3]) / gt[5]);
        }

        match self.geo_transform.invert() {
            Ok(inverse) => inverse.apply(point.x(), point.y()),
            Err(_) => Point::new(f64::NAN, f64::NAN),
        }
    }

    /// The cell containing the point, the resulting cell is not necessarily on the map
    pub fn point_to_cell(&self, point: Point) -> Cell {
        let pixel = self.pixel_position(point);
        if !pixel.x().is_finite() || !pixel.y().is_finite() {
            return Cell::from_row_col(-1, -1);
        }

        Cell::from_row_col(pixel.y().floor() as i32, pixel.x().floor() as i32)
    }

    pub fn is_cell_on_map(&self, cell: Cell) -> bool {
        cell.index_in(self.size).is_some()
    }

    pub fn bounding_box(&self) -> Rect {
        let cols = self.size.cols as f64;
        let rows = self.size.rows as f64;
        let corners = [
            self.geo_transform.apply(0.0, 0.0),
            self.geo_transform.apply(cols, 0.0),
            self.geo_transform.apply(0.0, rows),
            self.geo_transform.apply(cols, rows),
        ];

        Rect::enclosing(corners).unwrap_or_else(|| Rect::from_points(self.top_left(), self.top_left()))
    }

    /// Extent of the grid in geographic coordinates
    pub fn latlon_bounds(&self) -> Result<LatLonBounds> {
        if self.is_geographic() {
            return Ok(LatLonBounds::from_geographic_rect(&self.bounding_box()));
        }

        let coord_trans = CoordinateTransformer::new(&self.projection, &epsg::WGS84.to_string())?;
        let bbox = algo::reproject_bounding_box(&self.bounding_box(), &coord_trans)?;
        Ok(LatLonBounds::from_geographic_rect(&bbox))
    }

    /// The grid of a raster where only every `factor`-th row and column is kept
    pub fn downsampled(&self, factor: usize) -> Result<Self> {
        if factor == 0 {
            return Err(Error::InvalidArgument("Downsample factor must be at least 1".into()));
        }

        Ok(RasterGrid {
            projection: self.projection.clone(),
            size: self.size.strided(factor),
            geo_transform: self.geo_transform.scaled(factor as f64),
            nodata: self.nodata,
        })
    }

    pub fn has_same_projection(&self, other: &RasterGrid) -> bool {
        match (self.epsg(), other.epsg()) {
            (Some(lhs), Some(rhs)) => lhs == rhs,
            _ => self.projection.trim() == other.projection.trim(),
        }
    }

    /// Same projection, dimensions and transform (within floating point tolerance), nodata is not compared
    pub fn is_aligned_with(&self, other: &RasterGrid) -> bool {
        self.size == other.size
            && self.has_same_projection(other)
            && self
                .geo_transform
                .relative_eq(&other.geo_transform, TRANSFORM_TOLERANCE, TRANSFORM_TOLERANCE)
    }

    /// Fails with `GridMismatch` when the grids are not aligned
    pub fn ensure_aligned_with(&self, other: &RasterGrid) -> Result<()> {
        if self.is_aligned_with(other) {
            Ok(())
        } else {
            Err(Error::GridMismatch {
                expected: self.to_string(),
                actual: other.to_string(),
            })
        }
    }
}

impl std::fmt::Display for RasterGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {:?}", self.projection, self.size, self.geo_transform)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn utm_grid() -> RasterGrid {
        RasterGrid::new(
            "EPSG:32718",
            RasterSize::with_rows_cols(10, 20),
            GeoTransform::new([650000.0, 30.0, 0.0, 5600000.0, 0.0, -30.0]),
            Some(-9999.0),
        )
    }

    #[test]
    fn cell_and_point_conversion() {
        let grid = utm_grid();
        assert_eq!(grid.cell_center(Cell::from_row_col(0, 0)), Point::new(650015.0, 5599985.0));
        assert_eq!(grid.point_to_cell(Point::new(650015.0, 5599985.0)), Cell::from_row_col(0, 0));
        assert_eq!(grid.point_to_cell(Point::new(650059.0, 5599941.0)), Cell::from_row_col(1, 1));

        let outside = grid.point_to_cell(Point::new(649999.0, 5599985.0));
        assert!(!grid.is_cell_on_map(outside));
    }

    #[test]
    fn bounding_box() {
        let bbox = utm_grid().bounding_box();
        assert_relative_eq!(bbox, Rect::from_bounds(650000.0, 5599700.0, 650600.0, 5600000.0));
    }

    #[test]
    fn grid_from_bounds() -> Result<()> {
        let bounds = Rect::from_bounds(-73.5, -40.0, -73.0, -39.5);
        let grid = RasterGrid::from_bounds("EPSG:4326", &bounds, RasterSize::with_rows_cols(50, 100), None)?;
        assert_relative_eq!(grid.cell_size_x(), 0.005);
        assert_relative_eq!(grid.cell_size_y(), -0.01);
        assert_relative_eq!(grid.bounding_box(), bounds, epsilon = 1e-12);
        assert!(grid.is_geographic());

        assert!(RasterGrid::from_bounds("EPSG:4326", &bounds, RasterSize::with_rows_cols(0, 100), None).is_err());
        Ok(())
    }

    #[test]
    fn downsampled_grid() -> Result<()> {
        let grid = utm_grid().downsampled(3)?;
        assert_eq!(grid.size(), RasterSize::with_rows_cols(4, 7));
        assert_eq!(grid.top_left(), utm_grid().top_left());
        assert_eq!(grid.cell_size_x(), 90.0);
        assert_eq!(grid.cell_size_y(), -90.0);
        assert!(utm_grid().downsampled(0).is_err());
        Ok(())
    }

    #[test]
    fn grid_alignment() {
        let grid = utm_grid();
        assert!(grid.ensure_aligned_with(&grid.clone().with_nodata(None)).is_ok());

        let shifted = RasterGrid::new(
            "EPSG:32718",
            grid.size(),
            GeoTransform::new([650030.0, 30.0, 0.0, 5600000.0, 0.0, -30.0]),
            None,
        );
        assert!(matches!(grid.ensure_aligned_with(&shifted), Err(Error::GridMismatch { .. })));

        let other_crs = RasterGrid::new("EPSG:32719", grid.size(), grid.geo_transform(), None);
        assert!(!grid.is_aligned_with(&other_crs));

        let other_size = RasterGrid::new("EPSG:32718", RasterSize::with_rows_cols(10, 21), grid.geo_transform(), None);
        assert!(!grid.is_aligned_with(&other_size));
    }

    #[test]
    fn latlon_bounds_of_projected_grid() -> Result<()> {
        let bounds = utm_grid().latlon_bounds()?;
        assert!(bounds.south < bounds.north);
        assert!(bounds.west < bounds.east);
        assert!(bounds.west > -74.0 && bounds.east < -73.0);
        assert!(bounds.south > -40.5 && bounds.north < -39.5);
        Ok(())
    }
}
