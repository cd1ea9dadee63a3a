//! Polygon feature sets: GeoJSON and shapefile reading, reprojection, rasterization and the dated fire history aggregation.

mod featureset;
mod geometry;
pub mod history;
pub mod io;
mod rasterize;

#[doc(inline)]
pub use featureset::VectorFeatureSet;
#[doc(inline)]
pub use history::FireHistory;
#[doc(inline)]
pub use rasterize::{BurnMode, rasterize, rasterize_mask, rasterize_with_mode};
