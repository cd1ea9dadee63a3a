use crate::{
    CoordinateTransformer, Error, GeoTransform, Point, RasterGrid, RasterSize, Rect, Result,
    crs::epsg,
    point::{self, euclidean_distance},
};

const DEFAULT_EDGE_SAMPLE_COUNT: usize = 25;
const MIN_EDGE_POINTS: usize = 2;

/// Reprojects a bounding box by sampling points along its edges.
///
/// Transforming only the four corners underestimates the extent when the edges of the box
/// become curved in the target coordinate system, so every edge is sampled and the enclosing
/// box of all the transformed points is returned.
pub fn reproject_bounding_box(bbox: &Rect, coord_trans: &CoordinateTransformer) -> Result<Rect> {
    reproject_bounding_box_with_edge_points(bbox, coord_trans, DEFAULT_EDGE_SAMPLE_COUNT)
}

fn reproject_bounding_box_with_edge_points(bbox: &Rect, coord_trans: &CoordinateTransformer, edge_points: usize) -> Result<Rect> {
    if coord_trans.is_identity() {
        return Ok(*bbox);
    }

    let points_per_edge = edge_points.max(MIN_EDGE_POINTS);

    let add_edge_points = |points: &mut Vec<Point>, start: Point, end: Point| {
        // the end point of an edge is the start point of the next one
        for i in 0..points_per_edge - 1 {
            let t = i as f64 / (points_per_edge - 1) as f64;
            points.push(point::interpolate(start, end, t));
        }
    };

    let mut all_points = Vec::with_capacity(points_per_edge * 4);
    add_edge_points(&mut all_points, bbox.top_left(), bbox.top_right());
    add_edge_points(&mut all_points, bbox.top_right(), bbox.bottom_right());
    add_edge_points(&mut all_points, bbox.bottom_right(), bbox.bottom_left());
    add_edge_points(&mut all_points, bbox.bottom_left(), bbox.top_left());

    coord_trans.transform_points_in_place(&mut all_points)?;

    Rect::enclosing(all_points.into_iter().filter(|p| p.x().is_finite() && p.y().is_finite()))
        .ok_or_else(|| Error::Runtime("Bounding box could not be transformed".into()))
}

/// Computes the grid a raster gets when it is warped to `target_projection` without an explicit target grid.
///
/// The extent is the reprojected bounding box, the cells are square and the resolution is chosen
/// so the diagonal of the extent covers the same amount of cells as in the source grid.
pub fn warp_grid(grid: &RasterGrid, target_projection: &str) -> Result<RasterGrid> {
    if grid.size().is_empty() {
        return Err(Error::InvalidArgument("Can not warp an empty grid".into()));
    }

    let coord_trans = CoordinateTransformer::new(grid.projection(), target_projection)?;
    if coord_trans.is_identity() {
        return Ok(RasterGrid::new(target_projection, grid.size(), grid.geo_transform(), grid.nodata()));
    }

    let bbox = reproject_bounding_box(&grid.bounding_box(), &coord_trans)?;
    let resolution = calculate_optimal_resolution(grid, &coord_trans)?;
    if !resolution.is_finite() || resolution <= 0.0 {
        return Err(Error::Runtime(format!("Invalid warp resolution: {resolution}")));
    }

    let rows = ((bbox.height() / resolution).round() as usize).max(1);
    let cols = ((bbox.width() / resolution).round() as usize).max(1);

    Ok(RasterGrid::new(
        target_projection,
        RasterSize::with_rows_cols(rows, cols),
        GeoTransform::from_top_left_and_cell_size(bbox.top_left(), resolution, -resolution),
        grid.nodata(),
    ))
}

/// The grid of `grid` warped to WGS84 longitude/latitude
pub fn geographic_grid(grid: &RasterGrid) -> Result<RasterGrid> {
    warp_grid(grid, &epsg::WGS84.to_string())
}

fn calculate_optimal_resolution(grid: &RasterGrid, coord_trans: &CoordinateTransformer) -> Result<f64> {
    let src_bbox = grid.bounding_box();
    let src_cell_size = grid.cell_size_x().abs();

    // the amount of cells covered by the diagonal of the source extent
    let src_diagonal = euclidean_distance(src_bbox.top_left(), src_bbox.bottom_right());
    let src_diagonal_cells = src_diagonal / src_cell_size;

    let dst_tl = coord_trans.transform_point(src_bbox.top_left())?;
    let dst_br = coord_trans.transform_point(src_bbox.bottom_right())?;
    let dst_diagonal = euclidean_distance(dst_tl, dst_br);

    Ok(dst_diagonal / src_diagonal_cells)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn utm_grid() -> RasterGrid {
        RasterGrid::new(
            "EPSG:32718",
            RasterSize::with_rows_cols(100, 200),
            GeoTransform::new([650000.0, 30.0, 0.0, 5600000.0, 0.0, -30.0]),
            Some(-9999.0),
        )
    }

    #[test]
    fn bounding_box_identity() -> Result<()> {
        let bbox = Rect::from_bounds(0.0, 0.0, 10.0, 10.0);
        let trans = CoordinateTransformer::new("EPSG:32718", "EPSG:32718")?;
        assert_eq!(reproject_bounding_box(&bbox, &trans)?, bbox);
        Ok(())
    }

    #[test]
    fn bounding_box_contains_transformed_corners() -> Result<()> {
        let grid = utm_grid();
        let trans = CoordinateTransformer::new(grid.projection(), "EPSG:4326")?;
        let bbox = reproject_bounding_box(&grid.bounding_box(), &trans)?;

        let src_bbox = grid.bounding_box();
        for corner in [src_bbox.top_left(), src_bbox.top_right(), src_bbox.bottom_left(), src_bbox.bottom_right()] {
            let p = trans.transform_point(corner)?;
            assert!(p.x() >= bbox.min_x() - 1e-12 && p.x() <= bbox.max_x() + 1e-12);
            assert!(p.y() >= bbox.min_y() - 1e-12 && p.y() <= bbox.max_y() + 1e-12);
        }

        Ok(())
    }

    #[test]
    fn geographic_grid_of_utm_grid() -> Result<()> {
        let grid = utm_grid();
        let geo_grid = geographic_grid(&grid)?;

        assert_eq!(geo_grid.projection(), "EPSG:4326");
        assert!(geo_grid.is_geographic());
        assert_eq!(geo_grid.nodata(), Some(-9999.0));
        assert_relative_eq!(geo_grid.cell_size_x(), -geo_grid.cell_size_y());

        // roughly the same amount of cells
        let src_cells = grid.size().cell_count() as f64;
        let dst_cells = geo_grid.size().cell_count() as f64;
        assert!(dst_cells > src_cells * 0.5 && dst_cells < src_cells * 2.0);

        // 30m is roughly 0.0003 degrees
        assert!(geo_grid.cell_size_x() > 0.0002 && geo_grid.cell_size_x() < 0.0005);
        Ok(())
    }

    #[test]
    fn warp_to_same_projection_keeps_grid() -> Result<()> {
        let grid = utm_grid();
        assert!(warp_grid(&grid, "EPSG:32718")?.is_aligned_with(&grid));
        Ok(())
    }
}
