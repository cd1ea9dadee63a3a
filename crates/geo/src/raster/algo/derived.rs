//! Secondary per cell products computed from aligned input bands.
//! NaN inputs propagate to the output, the nodata value of the resulting grids is NaN.

use crate::{
    RasterGrid, Result,
    raster::{Band, GeoRaster},
};

/// Added to the denominator of the normalized difference to avoid a division by zero
pub const NORMALIZED_DIFFERENCE_EPSILON: f32 = 1e-6;

fn derived_grid(grid: &RasterGrid) -> RasterGrid {
    grid.clone().with_nodata(Some(f64::NAN))
}

/// `(nir - red) / (nir + red + epsilon)`, the result is not clamped
pub fn normalized_difference(red: &GeoRaster, nir: &GeoRaster) -> Result<GeoRaster> {
    let result = red.zip_map(nir, |red, nir| (nir - red) / (nir + red + NORMALIZED_DIFFERENCE_EPSILON))?;
    let (grid, band) = result.into_parts();
    GeoRaster::new(derived_grid(&grid), band)
}

/// `sqrt(u² + v²)`
pub fn magnitude(u: &GeoRaster, v: &GeoRaster) -> Result<GeoRaster> {
    let result = u.zip_map(v, |u, v| u.hypot(v))?;
    let (grid, band) = result.into_parts();
    GeoRaster::new(derived_grid(&grid), band)
}

/// Terrain slope in degrees.
///
/// The gradient is computed with central differences in the interior and one sided differences
/// at the edges, using the absolute cell sizes of the grid as spacing.
/// Cells with a NaN elevation or a NaN neighbour get a NaN slope.
/// The grid should be projected with the same units horizontally and vertically, geographic grids give meaningless slopes.
pub fn slope(elevation: &GeoRaster) -> Result<GeoRaster> {
    let grid = elevation.grid();
    if grid.is_geographic() {
        log::warn!("Slope calculation on a geographic grid, cell sizes are expressed in degrees");
    }

    let dx_spacing = grid.cell_size_x().abs() as f32;
    let dy_spacing = grid.cell_size_y().abs() as f32;

    let band = elevation.band();
    let rows = band.rows();
    let cols = band.columns();

    let mut slope = Vec::with_capacity(band.len());
    for row in 0..rows {
        for col in 0..cols {
            if band.value(row, col).is_nan() {
                slope.push(f32::NAN);
                continue;
            }

            let dx = gradient(cols, col, dx_spacing, |c| band.value(row, c));
            let dy = gradient(rows, row, dy_spacing, |r| band.value(r, col));
            slope.push((dx * dx + dy * dy).sqrt().atan().to_degrees());
        }
    }

    GeoRaster::new(derived_grid(grid), Band::new(band.size(), slope)?)
}

/// Derivative at `index` of a sequence of `len` samples
fn gradient(len: usize, index: usize, spacing: f32, value: impl Fn(usize) -> f32) -> f32 {
    if len < 2 {
        return 0.0;
    }

    if index == 0 {
        (value(1) - value(0)) / spacing
    } else if index == len - 1 {
        (value(index) - value(index - 1)) / spacing
    } else {
        (value(index + 1) - value(index - 1)) / (2.0 * spacing)
    }
}
