use crate::{
    Error, RasterSize, Result,
    raster::{Band, BoundaryMask, GeoRaster},
};

fn check_factor(factor: usize) -> Result<()> {
    if factor == 0 {
        return Err(Error::InvalidArgument("Downsample factor must be at least 1".into()));
    }

    Ok(())
}

fn strided<T: Copy>(data: &[T], size: RasterSize, factor: usize) -> Vec<T> {
    data.chunks(size.cols)
        .step_by(factor)
        .flat_map(|row| row.iter().step_by(factor).copied())
        .collect()
}

/// Keeps every `factor`-th row and column of the band, starting with the first one
pub fn downsample_band(band: &Band, factor: usize) -> Result<Band> {
    check_factor(factor)?;
    if band.is_empty() {
        return Ok(band.clone());
    }

    Band::new(band.size().strided(factor), strided(band.as_slice(), band.size(), factor))
}

/// Strided subsample of the raster.
/// The cell size of the new grid is multiplied by `factor`, the top left corner is preserved.
pub fn downsample(raster: &GeoRaster, factor: usize) -> Result<GeoRaster> {
    let grid = raster.grid().downsampled(factor)?;
    GeoRaster::new(grid, downsample_band(raster.band(), factor)?)
}

pub fn downsample_mask(mask: &BoundaryMask, factor: usize) -> Result<BoundaryMask> {
    check_factor(factor)?;
    if mask.size().is_empty() {
        return Ok(mask.clone());
    }

    BoundaryMask::new(mask.size().strided(factor), strided(mask.as_slice(), mask.size(), factor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GeoTransform, RasterGrid};

    #[test]
    fn downsample_raster() -> Result<()> {
        let size = RasterSize::with_rows_cols(4, 5);
        let grid = RasterGrid::new(
            "EPSG:4326",
            size,
            GeoTransform::new([-73.5, 0.01, 0.0, -39.7, 0.0, -0.01]),
            None,
        );
        let raster = GeoRaster::new(grid, Band::new(size, (0..20).map(|v| v as f32).collect())?)?;

        let result = downsample(&raster, 3)?;
        assert_eq!(result.size(), RasterSize::with_rows_cols(2, 2));
        assert_eq!(result.band().as_slice(), &[0.0, 3.0, 15.0, 18.0]);
        assert_eq!(result.grid().top_left(), raster.grid().top_left());
        assert_eq!(result.grid().cell_size_x(), raster.grid().cell_size_x() * 3.0);
        assert_eq!(result.grid().cell_size_y(), raster.grid().cell_size_y() * 3.0);

        assert_eq!(downsample(&raster, 1)?, raster);
        assert!(downsample(&raster, 0).is_err());
        Ok(())
    }

    #[test]
    fn downsample_boundary_mask() -> Result<()> {
        let mask = BoundaryMask::new(RasterSize::with_rows_cols(3, 3), vec![true, false, true, false, false, false, true, false, false])?;
        let result = downsample_mask(&mask, 2)?;
        assert_eq!(result.size(), RasterSize::with_rows_cols(2, 2));
        assert_eq!(result.as_slice(), &[true, true, true, false]);
        Ok(())
    }
}
