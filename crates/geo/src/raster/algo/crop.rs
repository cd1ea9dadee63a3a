use crate::{
    Error, GeoTransform, RasterGrid, RasterSize, Rect, Result,
    raster::{Band, BoundaryMask, GeoRaster},
};

const PIXEL_EPSILON: f64 = 1e-9;

/// Crops the raster to the window of whole cells that covers `bounds`.
/// Fails with `EmptyIntersection` when the bounds do not overlap the raster.
pub fn crop_to_bounds(raster: &GeoRaster, bounds: &Rect) -> Result<GeoRaster> {
    let grid = raster.grid();
    if !grid.geo_transform().is_north_up() {
        return Err(Error::InvalidArgument("Cropping is only supported for north up rasters".into()));
    }

    let Some(area) = grid.bounding_box().intersection(bounds).filter(|area| !area.is_empty()) else {
        return Err(Error::EmptyIntersection);
    };

    let top_left = grid.top_left();
    let cell_x = grid.cell_size_x();
    let cell_y = grid.cell_size_y().abs();

    let first_col = (((area.min_x() - top_left.x()) / cell_x + PIXEL_EPSILON).floor().max(0.0)) as usize;
    let last_col = (((area.max_x() - top_left.x()) / cell_x - PIXEL_EPSILON).ceil() as usize).min(grid.columns());
    let first_row = (((top_left.y() - area.max_y()) / cell_y + PIXEL_EPSILON).floor().max(0.0)) as usize;
    let last_row = (((top_left.y() - area.min_y()) / cell_y - PIXEL_EPSILON).ceil() as usize).min(grid.rows());

    if first_col >= last_col || first_row >= last_row {
        return Err(Error::EmptyIntersection);
    }

    let size = RasterSize::with_rows_cols(last_row - first_row, last_col - first_col);
    let mut data = Vec::with_capacity(size.cell_count());
    for row in first_row..last_row {
        data.extend_from_slice(&raster.band().row_slice(row)[first_col..last_col]);
    }

    let window_top_left = grid.geo_transform().apply(first_col as f64, first_row as f64);
    let cropped_grid = RasterGrid::new(
        grid.projection(),
        size,
        GeoTransform::from_top_left_and_cell_size(window_top_left, grid.cell_size_x(), grid.cell_size_y()),
        grid.nodata(),
    );

    GeoRaster::new(cropped_grid, Band::new(size, data)?)
}

/// Sets the cells outside of the mask to NaN
pub fn mask_outside(raster: &GeoRaster, mask: &BoundaryMask) -> Result<GeoRaster> {
    mask.ensure_size(raster.size())?;

    let mut result = raster.clone();
    for (value, inside) in result.band_mut().as_mut_slice().iter_mut().zip(mask.as_slice()) {
        if !inside {
            *value = f32::NAN;
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::Point;

    fn raster() -> GeoRaster {
        let size = RasterSize::with_rows_cols(4, 4);
        let grid = RasterGrid::new(
            "EPSG:32718",
            size,
            GeoTransform::from_top_left_and_cell_size(Point::new(0.0, 40.0), 10.0, -10.0),
            Some(0.0),
        );
        GeoRaster::new(grid, Band::new(size, (0..16).map(|v| v as f32).collect()).unwrap()).unwrap()
    }

    #[test]
    fn crop_inner_window() -> Result<()> {
        // partially covered cells are included
        let cropped = crop_to_bounds(&raster(), &Rect::from_bounds(12.0, 5.0, 28.0, 20.0))?;
        assert_eq!(cropped.size(), RasterSize::with_rows_cols(2, 2));
        assert_eq!(cropped.band().as_slice(), &[9.0, 10.0, 13.0, 14.0]);
        assert_relative_eq!(cropped.grid().top_left(), Point::new(10.0, 20.0));
        assert_eq!(cropped.grid().nodata(), Some(0.0));
        Ok(())
    }

    #[test]
    fn crop_to_larger_bounds_keeps_everything() -> Result<()> {
        let src = raster();
        let cropped = crop_to_bounds(&src, &Rect::from_bounds(-100.0, -100.0, 100.0, 100.0))?;
        assert_eq!(cropped, src);
        Ok(())
    }

    #[test]
    fn crop_outside() {
        let res = crop_to_bounds(&raster(), &Rect::from_bounds(100.0, 100.0, 200.0, 200.0));
        assert!(matches!(res, Err(Error::EmptyIntersection)));
    }

    #[test]
    fn mask_cells() -> Result<()> {
        let src = raster();
        let mut inside = vec![false; 16];
        inside[5] = true;
        let masked = mask_outside(&src, &BoundaryMask::new(src.size(), inside)?)?;
        assert_eq!(masked.band().finite_count(), 1);
        assert_eq!(masked.band().value(1, 1), 5.0);

        let wrong_size = BoundaryMask::filled_with(RasterSize::with_rows_cols(2, 2), true);
        assert!(mask_outside(&src, &wrong_size).is_err());
        Ok(())
    }
}
