//! Algorithms on georeferenced rasters (warp, downsample, crop, derived bands, statistics).

mod crop;
mod derived;
mod downsample;
mod reproject;
mod statistics;
mod warp;

pub use crop::{crop_to_bounds, mask_outside};
pub use derived::{NORMALIZED_DIFFERENCE_EPSILON, magnitude, normalized_difference, slope};
pub use downsample::{downsample, downsample_band, downsample_mask};
pub use reproject::{Kernel, WarpOptions, reproject, reproject_to_geographic, reproject_with_options};
pub use statistics::{nan_percentile, nan_percentiles, percentile_range};
pub use warp::{geographic_grid, reproject_bounding_box, warp_grid};
