use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Source not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Optional source missing: {0}")]
    OptionalSourceMissing(PathBuf),
    #[error("Raster grids do not match (expected {expected}, got {actual})")]
    GridMismatch { expected: String, actual: String },
    #[error("No data intersects the region of interest")]
    EmptyIntersection,
    #[error("Malformed date: {0}")]
    MalformedDate(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("TIFF error: {0}")]
    TiffError(#[from] tiff::TiffError),
    #[error("Projection error: {0}")]
    ProjError(#[from] proj4rs::errors::Error),
    #[error("Geometry error: {0}")]
    GeozeroError(#[from] geozero::error::GeozeroError),
    #[error("Shapefile error: {0}")]
    ShapefileError(#[from] shapefile::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("PNG error: {0}")]
    PngError(#[from] png::EncodingError),
    #[error("{0}")]
    InfError(#[from] inf::Error),
}

impl Error {
    /// Recoverable conditions that lead to an omitted or empty output instead of aborting the pipeline
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::OptionalSourceMissing(_) | Error::EmptyIntersection | Error::MalformedDate(_)
        )
    }
}
