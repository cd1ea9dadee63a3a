//! Preprocessing: aligns the input rasters on the reference grid and generates the fire history rasters.

use std::path::{Path, PathBuf};

use geo::{
    Error, RasterGrid,
    raster::{
        algo::{self, Kernel},
        io,
    },
    vector::{
        FireHistory,
        history::{self, NOT_BURNED},
    },
};

use crate::{PipelineConfig, PreprocessConfig, Result};

/// Paths of the generated fire history rasters
#[derive(Debug, Clone)]
pub struct FireOutputs {
    pub cumulative: PathBuf,
    pub most_recent: PathBuf,
    pub history: FireHistory,
}

/// Summary of a preprocessing run
#[derive(Debug, Default)]
pub struct PreprocessReport {
    pub aligned: Vec<PathBuf>,
    /// Sources that were not found
    pub skipped: Vec<PathBuf>,
    /// Absent when no fire datasets were found
    pub fires: Option<FireOutputs>,
}

/// Reprojects band 1 of the source (bilinear) onto the reference grid and writes it as `f32` GeoTIFF.
/// Cells without source data are written as `fill_value`, which is also the nodata value of the output.
/// Fails with `OptionalSourceMissing` when the source does not exist.
pub fn align_raster(source: &Path, output: &Path, reference: &RasterGrid, fill_value: f64) -> Result<()> {
    if !source.exists() {
        return Err(Error::OptionalSourceMissing(source.to_path_buf()));
    }

    let target = reference.clone().with_nodata(Some(fill_value));
    let aligned = algo::reproject(&io::read_band(source, 1)?, &target, Kernel::Bilinear)?;
    io::write_raster(output, &aligned)?;

    log::info!("Aligned {} -> {}", source.display(), output.display());
    Ok(())
}

/// Discovers the dated fire datasets and writes the cumulative and most recent burn rasters (`u8`, nodata 0)
/// on the reference grid. Returns `None` without writing anything when no datasets are found.
pub fn process_fires(config: &PreprocessConfig, reference: &RasterGrid) -> Result<Option<FireOutputs>> {
    let paths = history::discover_datasets(
        &config.fire_history_dir,
        &config.fire_dataset_prefix,
        &config.fire_dataset_extension,
    )?;

    if paths.is_empty() {
        log::warn!("No fire datasets found in {}", config.fire_history_dir.display());
        return Ok(None);
    }

    let datasets = history::load_datasets(&paths);
    let history = history::aggregate(&datasets, reference)?;

    std::fs::create_dir_all(&config.processed_dir)?;
    let grid = reference.clone().with_nodata(Some(NOT_BURNED as f64));
    let cumulative = config.processed_dir.join(&config.cumulative_fire_output);
    let most_recent = config.processed_dir.join(&config.recent_fire_output);
    io::write_raster_u8(&cumulative, &grid, history.cumulative.band())?;
    io::write_raster_u8(&most_recent, &grid, history.most_recent.band())?;

    log::info!(
        "Fire history of {} datasets written to {} and {}",
        history.contributing,
        cumulative.display(),
        most_recent.display()
    );

    Ok(Some(FireOutputs {
        cumulative,
        most_recent,
        history,
    }))
}

/// Runs the complete preprocessing.
/// The reference raster is required, missing optional sources are reported and skipped.
pub fn run(config: &PipelineConfig) -> Result<PreprocessReport> {
    let config = &config.preprocess;
    let reference = RasterGrid::from_file(&config.reference_raster)?;
    log::info!("Reference grid: {reference}");

    std::fs::create_dir_all(&config.processed_dir)?;

    let mut report = PreprocessReport::default();
    for layer in &config.aligned_layers {
        let output = config.processed_dir.join(&layer.output);
        match align_raster(&layer.source, &output, &reference, config.fill_value) {
            Ok(()) => report.aligned.push(output),
            Err(err) if err.is_recoverable() => {
                log::warn!("Skipping {}: {err}", layer.output);
                report.skipped.push(layer.source.clone());
            }
            Err(err) => return Err(err),
        }
    }

    report.fires = match process_fires(config, &reference) {
        Ok(fires) => fires,
        Err(err) if err.is_recoverable() => {
            log::warn!("Fire history not generated: {err}");
            None
        }
        Err(err) => return Err(err),
    };

    Ok(report)
}
