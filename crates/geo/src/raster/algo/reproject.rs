use std::ops::RangeInclusive;

use crate::{
    Cell, CoordinateTransformer, Error, Point, RasterGrid, Result,
    point::{self, euclidean_distance},
    raster::{Band, GeoRaster},
};

use super::warp;

const MIN_WEIGHT: f64 = 1e-9;

/// Resampling kernel used to compute the value of a target cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Kernel {
    /// Value of the source cell that contains the target cell center (categorical data)
    #[default]
    Nearest,
    /// Weighted average of the four closest source cell centers (continuous data)
    Bilinear,
}

#[derive(Debug, Clone)]
pub struct WarpOptions {
    pub kernel: Kernel,
    /// Linear interpolation threshold in source pixels, if the linear interpolation error of a row segment is bigger than this threshold
    /// exact calculations will be used (default = 0.125, 0 transforms every cell)
    pub error_threshold: f64,
}

impl WarpOptions {
    pub fn with_kernel(kernel: Kernel) -> Self {
        WarpOptions {
            kernel,
            ..Default::default()
        }
    }
}

impl Default for WarpOptions {
    fn default() -> Self {
        Self {
            kernel: Kernel::default(),
            error_threshold: 0.125,
        }
    }
}

/// Resamples `src` onto the `target` grid.
/// Source nodata and target cells outside of the source extent are NaN in the result.
pub fn reproject(src: &GeoRaster, target: &RasterGrid, kernel: Kernel) -> Result<GeoRaster> {
    reproject_with_options(src, target, &WarpOptions::with_kernel(kernel))
}

pub fn reproject_with_options(src: &GeoRaster, target: &RasterGrid, opts: &WarpOptions) -> Result<GeoRaster> {
    if target.size().is_empty() {
        return Err(Error::InvalidArgument("Reprojection target grid is empty".into()));
    }

    if src.grid().is_aligned_with(target) {
        let band = src.band().clone().with_nodata_as_nan(src.grid().nodata());
        return GeoRaster::new(target.clone(), band);
    }

    // target world coordinates are transformed back into the source coordinate system
    let mapper = SourcePixelMapper {
        coord_trans: CoordinateTransformer::new(target.projection(), src.grid().projection())?,
        source: src.grid(),
    };

    let sampler = Sampler {
        band: src.band(),
        nodata: src.grid().nodata().filter(|nod| !nod.is_nan()).map(|nod| nod as f32),
        kernel: opts.kernel,
    };

    let cols = target.columns();
    let mut dst = Band::filled_with_nodata(target.size());
    let mut positions = vec![Point::new(f64::NAN, f64::NAN); cols];

    for (row, row_slice) in dst.as_mut_slice().chunks_mut(cols).enumerate() {
        if opts.error_threshold > 0.0 {
            subdivide_segment(&mut positions, target, row, 0..=cols - 1, &mapper, opts.error_threshold)?;
        } else {
            mapper.map_exact(&mut positions, target, row, 0)?;
        }

        for (value, pixel) in row_slice.iter_mut().zip(&positions) {
            *value = sampler.sample(*pixel);
        }
    }

    log::debug!(
        "Reprojected {} to {} ({:?}): {} valid cells",
        src.grid(),
        target,
        opts.kernel,
        dst.finite_count()
    );

    GeoRaster::new(target.clone(), dst)
}

/// Reprojects to WGS84 longitude/latitude on the default grid computed from the source extent.
/// The nodata value of the result is NaN.
pub fn reproject_to_geographic(src: &GeoRaster, kernel: Kernel) -> Result<GeoRaster> {
    let target = warp::geographic_grid(src.grid())?.with_nodata(Some(f64::NAN));
    reproject(src, &target, kernel)
}

struct SourcePixelMapper<'a> {
    coord_trans: CoordinateTransformer,
    source: &'a RasterGrid,
}

impl SourcePixelMapper<'_> {
    /// Converts target world coordinates into fractional source pixel positions
    fn to_source_pixels(&self, points: &mut [Point]) -> Result<()> {
        self.coord_trans.transform_points_in_place(points)?;
        for p in points.iter_mut() {
            *p = self.source.pixel_position(*p);
        }

        Ok(())
    }

    fn map_exact(&self, positions: &mut [Point], target: &RasterGrid, row: usize, start_col: usize) -> Result<()> {
        for (i, pos) in positions.iter_mut().enumerate() {
            *pos = target.cell_center(Cell::from_row_col(row as i32, (start_col + i) as i32));
        }

        self.to_source_pixels(positions)
    }
}

/// Recursively subdivide a segment of a row, segments where the linear interpolation of the
/// end points is accurate enough are not transformed cell by cell
fn subdivide_segment(
    positions: &mut [Point],
    target: &RasterGrid,
    row: usize,
    columns: RangeInclusive<usize>,
    mapper: &SourcePixelMapper,
    error_threshold: f64,
) -> Result<()> {
    let start_col = *columns.start();
    let end_col = *columns.end();
    let middle_col = (start_col + end_col) / 2;

    debug_assert!(positions.len() == end_col - start_col + 1);

    if positions.len() <= 2 {
        return mapper.map_exact(positions, target, row, start_col);
    }

    let mut points = [
        target.cell_center(Cell::from_row_col(row as i32, start_col as i32)),
        target.cell_center(Cell::from_row_col(row as i32, middle_col as i32)),
        target.cell_center(Cell::from_row_col(row as i32, end_col as i32)),
    ];
    mapper.to_source_pixels(&mut points)?;
    let [start_pixel, middle_pixel, end_pixel] = points;

    let span = (end_col - start_col) as f64;
    let interpolated_middle = point::interpolate(start_pixel, end_pixel, (middle_col - start_col) as f64 / span);
    let error = euclidean_distance(middle_pixel, interpolated_middle);

    if error < error_threshold {
        for (i, pos) in positions.iter_mut().enumerate() {
            *pos = point::interpolate(start_pixel, end_pixel, i as f64 / span);
        }
    } else {
        let (first_half, second_half) = positions.split_at_mut(middle_col - start_col + 1);
        subdivide_segment(first_half, target, row, start_col..=middle_col, mapper, error_threshold)?;
        subdivide_segment(second_half, target, row, middle_col + 1..=end_col, mapper, error_threshold)?;
    }

    Ok(())
}

struct Sampler<'a> {
    band: &'a Band,
    nodata: Option<f32>,
    kernel: Kernel,
}

impl Sampler<'_> {
    fn valid_value(&self, row: usize, col: usize) -> Option<f32> {
        let value = self.band.value(row, col);
        if value.is_nan() || Some(value) == self.nodata {
            None
        } else {
            Some(value)
        }
    }

    /// `pixel` is the fractional (col, row) position in the source raster
    fn sample(&self, pixel: Point) -> f32 {
        let cols = self.band.columns() as f64;
        let rows = self.band.rows() as f64;
        if !(pixel.x() >= 0.0 && pixel.x() < cols && pixel.y() >= 0.0 && pixel.y() < rows) {
            return f32::NAN;
        }

        match self.kernel {
            Kernel::Nearest => self
                .valid_value(pixel.y().floor() as usize, pixel.x().floor() as usize)
                .unwrap_or(f32::NAN),
            Kernel::Bilinear => self.sample_bilinear(pixel),
        }
    }

    fn sample_bilinear(&self, pixel: Point) -> f32 {
        // distances are measured between cell centers
        let x = pixel.x() - 0.5;
        let y = pixel.y() - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;

        let clamp_col = |c: f64| (c.max(0.0) as usize).min(self.band.columns() - 1);
        let clamp_row = |r: f64| (r.max(0.0) as usize).min(self.band.rows() - 1);
        let (c0, c1) = (clamp_col(x0), clamp_col(x0 + 1.0));
        let (r0, r1) = (clamp_row(y0), clamp_row(y0 + 1.0));

        let neighbours = [
            (r0, c0, (1.0 - fx) * (1.0 - fy)),
            (r0, c1, fx * (1.0 - fy)),
            (r1, c0, (1.0 - fx) * fy),
            (r1, c1, fx * fy),
        ];

        let mut sum = 0.0;
        let mut weight_sum = 0.0;
        for (row, col, weight) in neighbours {
            if weight <= 0.0 {
                continue;
            }

            if let Some(value) = self.valid_value(row, col) {
                sum += value as f64 * weight;
                weight_sum += weight;
            }
        }

        // weights of missing neighbours are redistributed over the valid ones
        if weight_sum > MIN_WEIGHT {
            (sum / weight_sum) as f32
        } else {
            f32::NAN
        }
    }
}
