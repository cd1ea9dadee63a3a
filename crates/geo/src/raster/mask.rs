use crate::raster::Band;
use crate::{Error, RasterSize, Result};

/// Area of interest mask: `true` marks the cells inside the area
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryMask {
    size: RasterSize,
    data: Vec<bool>,
}

impl BoundaryMask {
    pub fn new(size: RasterSize, data: Vec<bool>) -> Result<Self> {
        if data.len() != size.cell_count() {
            return Err(Error::InvalidArgument(format!(
                "Mask data length ({}) does not match the raster size {size}",
                data.len()
            )));
        }

        Ok(BoundaryMask { size, data })
    }

    pub fn filled_with(size: RasterSize, inside: bool) -> Self {
        BoundaryMask {
            size,
            data: vec![inside; size.cell_count()],
        }
    }

    /// Cells with a finite, non zero value are inside
    pub fn from_band(band: &Band) -> Self {
        BoundaryMask {
            size: band.size(),
            data: band.iter().map(|v| v.is_finite() && v != 0.0).collect(),
        }
    }

    pub fn size(&self) -> RasterSize {
        self.size
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.data[row * self.size.cols + col]
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.data
    }

    pub fn inside_count(&self) -> usize {
        self.data.iter().filter(|inside| **inside).count()
    }

    pub fn ensure_size(&self, size: RasterSize) -> Result<()> {
        if self.size != size {
            return Err(Error::GridMismatch {
                expected: size.to_string(),
                actual: self.size.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_from_band() -> Result<()> {
        let band = Band::new(RasterSize::with_rows_cols(2, 2), vec![0.0, 1.0, f32::NAN, 255.0])?;
        let mask = BoundaryMask::from_band(&band);
        assert_eq!(mask.as_slice(), &[false, true, false, true]);
        assert_eq!(mask.inside_count(), 2);
        assert!(mask.contains(1, 1));
        Ok(())
    }

    #[test]
    fn size_check() {
        let mask = BoundaryMask::filled_with(RasterSize::with_rows_cols(2, 2), true);
        assert!(mask.ensure_size(RasterSize::with_rows_cols(2, 2)).is_ok());
        assert!(matches!(mask.ensure_size(RasterSize::with_rows_cols(2, 3)), Err(Error::GridMismatch { .. })));
        assert!(BoundaryMask::new(RasterSize::with_rows_cols(2, 2), vec![true; 3]).is_err());
    }
}
