#![warn(clippy::unwrap_used)]

pub type Result<T = ()> = std::result::Result<T, Error>;

mod cell;
pub mod crs;
mod error;
mod geotransform;
mod latlonbounds;
pub mod overlay;
mod point;
pub mod raster;
mod rastergrid;
mod rastersize;
pub mod rect;
mod srs;
pub mod vector;

#[doc(inline)]
pub use cell::Cell;
#[doc(inline)]
pub use crs::Epsg;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use geotransform::GeoTransform;
#[doc(inline)]
pub use latlonbounds::LatLonBounds;
#[doc(inline)]
pub use overlay::RgbaBuffer;
pub use point::Point;
#[doc(inline)]
pub use raster::{Band, BoundaryMask, GeoRaster};
#[doc(inline)]
pub use rastergrid::RasterGrid;
#[doc(inline)]
pub use rastersize::RasterSize;
#[doc(inline)]
pub use rect::Rect;
#[doc(inline)]
pub use srs::{CoordinateTransformer, SpatialReference};
#[doc(inline)]
pub use vector::VectorFeatureSet;
