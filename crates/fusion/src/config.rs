use std::{
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

use geo::vector::BurnMode;

/// A raster that is aligned on the reference grid during preprocessing
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlignedLayer {
    pub source: PathBuf,
    /// File name of the aligned raster in the processed directory
    pub output: String,
}

impl AlignedLayer {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<String>) -> Self {
        AlignedLayer {
            source: source.into(),
            output: output.into(),
        }
    }
}

/// Inputs and outputs of the preprocessing pipeline
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PreprocessConfig {
    /// The master raster that defines the reference grid
    pub reference_raster: PathBuf,
    pub processed_dir: PathBuf,
    pub aligned_layers: Vec<AlignedLayer>,
    /// Value of the aligned cells that have no source data
    pub fill_value: f64,
    /// Directory tree that is searched for dated fire footprint datasets
    pub fire_history_dir: PathBuf,
    pub fire_dataset_prefix: String,
    pub fire_dataset_extension: String,
    pub cumulative_fire_output: String,
    pub recent_fire_output: String,
}

/// Inputs of the map layer stack
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapLayerConfig {
    pub hazard_raster: PathBuf,
    /// Polygon(s) of the area of interest
    pub boundary: PathBuf,
    pub vegetation_raster: PathBuf,
    pub red_band: usize,
    pub nir_band: usize,
    pub elevation_raster: PathBuf,
    pub wind_raster: PathBuf,
    pub wind_u_band: usize,
    pub wind_v_band: usize,
}

/// Rendering options of the overlays
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderConfig {
    pub downsample_factor: usize,
    /// The hazard classes that are drawn, the others are transparent
    pub hazard_classes: RangeInclusive<i64>,
    pub class_opacity: f64,
    pub continuous_opacity: f64,
    /// Value range of the vegetation index ramp
    pub vegetation_range: (f64, f64),
    /// Low and high quantile (0..=1) used as value range of the other continuous layers
    pub percentile_clip: (f64, f64),
    pub boundary_burn_mode: BurnMode,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            downsample_factor: 3,
            hazard_classes: 1..=4,
            class_opacity: 0.85,
            continuous_opacity: 0.6,
            vegetation_range: (-1.0, 1.0),
            percentile_clip: (0.02, 0.98),
            boundary_burn_mode: BurnMode::default(),
        }
    }
}

/// Configuration of the complete pipeline, the default configuration uses the conventional
/// data layout (`data/raw`, `data/processed`) relative to the working directory
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineConfig {
    pub preprocess: PreprocessConfig,
    pub map_layers: MapLayerConfig,
    pub render: RenderConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig::with_project_root(".")
    }
}

impl PipelineConfig {
    pub fn with_project_root(root: impl AsRef<Path>) -> Self {
        let raw = root.as_ref().join("data").join("raw");
        let processed = root.as_ref().join("data").join("processed");
        let conaf = |name: &str| raw.join(format!("conaf_{name}")).join("raster").join(format!("14_{name}.tif"));

        PipelineConfig {
            preprocess: PreprocessConfig {
                reference_raster: raw.join("srtm_valdivia.tif"),
                processed_dir: processed,
                aligned_layers: vec![
                    AlignedLayer::new(raw.join("srtm_valdivia.tif"), "grid_altura.tif"),
                    AlignedLayer::new(raw.join("sentinel2_valdivia.tif"), "grid_vegetacion.tif"),
                    AlignedLayer::new(raw.join("era5_wind_valdivia.tif"), "grid_viento.tif"),
                    AlignedLayer::new(conaf("amenaza"), "grid_amenaza.tif"),
                    AlignedLayer::new(conaf("riesgo"), "grid_riesgo.tif"),
                ],
                fill_value: 0.0,
                fire_history_dir: raw.join("incendios_pangaea"),
                fire_dataset_prefix: "FireScar".to_string(),
                fire_dataset_extension: "shp".to_string(),
                cumulative_fire_output: "grid_incendios_historicos.tif".to_string(),
                recent_fire_output: "grid_incendio_reciente.tif".to_string(),
            },
            map_layers: MapLayerConfig {
                hazard_raster: conaf("riesgo"),
                boundary: raw.join("comuna").join("comuna_valdivia.shp"),
                vegetation_raster: raw.join("sentinel2_valdivia_comuna.tif"),
                red_band: 1,
                nir_band: 4,
                elevation_raster: raw.join("srtm_valdivia_comuna.tif"),
                wind_raster: raw.join("era5_wind_valdivia_comuna.tif"),
                wind_u_band: 1,
                wind_v_band: 2,
            },
            render: RenderConfig::default(),
        }
    }

    #[cfg(feature = "serde")]
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(crate::Error::SourceNotFound(path.to_path_buf()));
        }

        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conventional_layout() {
        let config = PipelineConfig::with_project_root("/project");
        assert_eq!(config.preprocess.reference_raster, Path::new("/project/data/raw/srtm_valdivia.tif"));
        assert_eq!(config.preprocess.processed_dir, Path::new("/project/data/processed"));
        assert_eq!(
            config.map_layers.hazard_raster,
            Path::new("/project/data/raw/conaf_riesgo/raster/14_riesgo.tif")
        );
        assert_eq!(config.preprocess.aligned_layers.len(), 5);
        assert_eq!(
            config.preprocess.aligned_layers[3].source,
            Path::new("/project/data/raw/conaf_amenaza/raster/14_amenaza.tif")
        );
        assert_eq!(
            config.map_layers.boundary,
            Path::new("/project/data/raw/comuna/comuna_valdivia.shp")
        );
        assert_eq!(config.preprocess.fire_dataset_extension, "shp");
        assert_eq!(config.render.downsample_factor, 3);
        assert_eq!(config.render.hazard_classes, 1..=4);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_config() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.json");

        let mut config = PipelineConfig::with_project_root(dir.path());
        config.render.downsample_factor = 2;
        std::fs::write(&path, serde_json::to_string_pretty(&config)?)?;

        assert_eq!(PipelineConfig::from_json_file(&path)?, config);
        Ok(())
    }
}
