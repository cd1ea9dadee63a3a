//! In memory rasters: bands of samples and the grids that describe them.

pub mod algo;
mod band;
pub mod io;
mod mask;

#[doc(inline)]
pub use band::{Band, GeoRaster};
#[doc(inline)]
pub use mask::BoundaryMask;
