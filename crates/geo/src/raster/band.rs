use crate::{Cell, Error, RasterGrid, RasterSize, Result};

/// A 2 dimensional array of floating point samples stored in row major order.
/// Missing data is represented as NaN.
#[derive(Clone, Debug, PartialEq)]
pub struct Band {
    size: RasterSize,
    data: Vec<f32>,
}

impl Band {
    pub fn new(size: RasterSize, data: Vec<f32>) -> Result<Self> {
        if data.len() != size.cell_count() {
            return Err(Error::InvalidArgument(format!(
                "Band data length ({}) does not match the raster size {size}",
                data.len()
            )));
        }

        Ok(Band { size, data })
    }

    pub fn filled_with(size: RasterSize, value: f32) -> Self {
        Band {
            size,
            data: vec![value; size.cell_count()],
        }
    }

    pub fn filled_with_nodata(size: RasterSize) -> Self {
        Self::filled_with(size, f32::NAN)
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

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn value(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.size.cols + col]
    }

    pub fn set_value(&mut self, row: usize, col: usize, value: f32) {
        self.data[row * self.size.cols + col] = value;
    }

    pub fn cell_value(&self, cell: Cell) -> Option<f32> {
        cell.index_in(self.size).map(|idx| self.data[idx])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    pub fn row_slice(&self, row: usize) -> &[f32] {
        let start = row * self.size.cols;
        &self.data[start..start + self.size.cols]
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().copied()
    }

    /// The finite samples of the band
    pub fn iter_values(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().copied().filter(|v| v.is_finite())
    }

    pub fn finite_count(&self) -> usize {
        self.iter_values().count()
    }

    /// Applies `op` to every sample
    pub fn map(&self, op: impl Fn(f32) -> f32) -> Band {
        Band {
            size: self.size,
            data: self.data.iter().map(|v| op(*v)).collect(),
        }
    }

    /// Combines the samples of two bands of the same size
    pub fn zip_map(&self, other: &Band, op: impl Fn(f32, f32) -> f32) -> Result<Band> {
        if self.size != other.size {
            return Err(Error::GridMismatch {
                expected: self.size.to_string(),
                actual: other.size.to_string(),
            });
        }

        Ok(Band {
            size: self.size,
            data: self.data.iter().zip(other.data.iter()).map(|(a, b)| op(*a, *b)).collect(),
        })
    }

    /// Replaces samples equal to `nodata` with NaN
    pub fn with_nodata_as_nan(mut self, nodata: Option<f64>) -> Band {
        if let Some(nodata) = nodata.filter(|nod| !nod.is_nan()) {
            let nodata = nodata as f32;
            self.data.iter_mut().filter(|v| **v == nodata).for_each(|v| *v = f32::NAN);
        }
        self
    }
}

/// A band together with the grid that describes it
#[derive(Clone, Debug, PartialEq)]
pub struct GeoRaster {
    grid: RasterGrid,
    band: Band,
}

impl GeoRaster {
    pub fn new(grid: RasterGrid, band: Band) -> Result<Self> {
        if grid.size() != band.size() {
            return Err(Error::GridMismatch {
                expected: grid.size().to_string(),
                actual: band.size().to_string(),
            });
        }

        Ok(GeoRaster { grid, band })
    }

    pub fn filled_with(grid: RasterGrid, value: f32) -> Self {
        let band = Band::filled_with(grid.size(), value);
        GeoRaster { grid, band }
    }

    pub fn filled_with_nodata(grid: RasterGrid) -> Self {
        Self::filled_with(grid, f32::NAN)
    }

    pub fn grid(&self) -> &RasterGrid {
        &self.grid
    }

    pub fn band(&self) -> &Band {
        &self.band
    }

    pub fn band_mut(&mut self) -> &mut Band {
        &mut self.band
    }

    pub fn size(&self) -> RasterSize {
        self.band.size()
    }

    pub fn into_parts(self) -> (RasterGrid, Band) {
        (self.grid, self.band)
    }

    pub fn into_band(self) -> Band {
        self.band
    }

    /// Applies `op` to every sample, the grid is unchanged
    pub fn map(&self, op: impl Fn(f32) -> f32) -> GeoRaster {
        GeoRaster {
            grid: self.grid.clone(),
            band: self.band.map(op),
        }
    }

    /// Combines two rasters cell by cell, fails with `GridMismatch` when the grids are not aligned
    pub fn zip_map(&self, other: &GeoRaster, op: impl Fn(f32, f32) -> f32) -> Result<GeoRaster> {
        self.grid.ensure_aligned_with(&other.grid)?;
        Ok(GeoRaster {
            grid: self.grid.clone(),
            band: self.band.zip_map(&other.band, op)?,
        })
    }
}
