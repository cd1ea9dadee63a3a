#![warn(clippy::unwrap_used)]

pub use error::Error;
pub type Result<T = ()> = std::result::Result<T, Error>;

pub mod color;
pub mod colormap;
mod colormapper;
mod error;
pub mod interpolate;
pub mod legend;

#[doc(inline)]
pub use color::Color;
#[doc(inline)]
pub use colormap::{ColorMapPreset, ProcessedColorMap};
#[doc(inline)]
pub use colormapper::{ClassificationScheme, ColorMapper, ContinuousColorRamp};
#[doc(inline)]
pub use legend::{LegendCategory, LegendEntry, MappingConfig};
