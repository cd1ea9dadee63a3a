//! Geospatial raster alignment and fusion of wildfire layers.
//!
//! - [`inf`]: colors, color ramps, classification schemes and legends
//! - [`geo`]: grids, rasters, reprojection, rasterization and overlay composition
//! - [`fusion`]: the preprocessing and map layer pipelines

pub use fusion;
pub use geo;
pub use inf;
