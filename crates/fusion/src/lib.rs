#![warn(clippy::unwrap_used)]

//! Assembly of the alignment and fusion engine into the wildfire data pipelines:
//! preprocessing of the inputs on the reference grid and loading of the map layer stack.

mod config;
pub mod layers;
pub mod overlays;
pub mod preprocess;
pub mod simulation;

pub use config::{AlignedLayer, MapLayerConfig, PipelineConfig, PreprocessConfig, RenderConfig};
pub use layers::{ContinuousLayer, MapLayers};
pub use overlays::{LayerKind, Overlay};
pub use preprocess::{FireOutputs, PreprocessReport};
pub use simulation::{BurnOverlay, ResampledHazard};

pub type Error = geo::Error;
pub type Result<T = ()> = geo::Result<T>;
