//! The typed layer stack of the map: every layer lives on the same downsampled geographic grid.
//!
//! The hazard raster defines the grid: it is cropped and masked to the boundary, moved to
//! geographic coordinates and downsampled. The continuous layers are derived on their own source grid
//! and resampled onto the geographic grid before downsampling.

use std::path::Path;

use geo::{
    Band, BoundaryMask, Error, GeoRaster, LatLonBounds, RasterGrid, VectorFeatureSet,
    crs::epsg,
    raster::{
        algo::{self, Kernel},
        io,
    },
    vector,
};

use crate::{MapLayerConfig, PipelineConfig, RenderConfig, Result};

/// A continuous layer with the value range of its color ramp, the range is absent when the layer has no valid data
#[derive(Clone, Debug)]
pub struct ContinuousLayer {
    pub raster: GeoRaster,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
}

impl ContinuousLayer {
    fn with_fixed_range(raster: GeoRaster, (vmin, vmax): (f64, f64)) -> Self {
        ContinuousLayer {
            raster,
            vmin: Some(vmin),
            vmax: Some(vmax),
        }
    }

    fn with_percentile_range(raster: GeoRaster, (low, high): (f64, f64)) -> Result<Self> {
        let range = algo::percentile_range(raster.band(), low, high)?;
        if range.is_none() {
            log::warn!("No valid samples to derive the value range from");
        }

        Ok(ContinuousLayer {
            raster,
            vmin: range.map(|r| r.0),
            vmax: range.map(|r| r.1),
        })
    }
}

#[derive(Clone, Debug)]
pub struct MapLayers {
    /// The downsampled geographic grid shared by all layers
    pub grid: RasterGrid,
    pub bounds: LatLonBounds,
    /// The area of interest in geographic coordinates
    pub boundary: VectorFeatureSet,
    pub boundary_mask: BoundaryMask,
    pub hazard: GeoRaster,
    pub vegetation: Option<ContinuousLayer>,
    pub elevation: Option<ContinuousLayer>,
    pub slope: Option<ContinuousLayer>,
    pub wind: Option<ContinuousLayer>,
}

impl MapLayers {
    /// Loads the layer stack, the hazard raster and the boundary are required, the other layers are
    /// omitted when their source is missing
    pub fn load(config: &PipelineConfig) -> Result<MapLayers> {
        let inputs = &config.map_layers;
        let render = &config.render;

        let boundary = vector::io::read(&inputs.boundary)?;
        if boundary.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "No boundary polygons in {}",
                inputs.boundary.display()
            )));
        }

        let hazard = io::read_band(&inputs.hazard_raster, 1)?;
        let hazard = clip_to_boundary(&hazard, &boundary, render)?;

        let geographic_hazard = algo::reproject_to_geographic(&hazard, Kernel::Nearest)?;
        let geographic_grid = geographic_hazard.grid().clone();
        let hazard = algo::downsample(&geographic_hazard, render.downsample_factor)?;
        let grid = hazard.grid().clone();
        let bounds = grid.latlon_bounds()?;

        let boundary = boundary.reprojected(&epsg::WGS84.to_string())?;
        let boundary_mask = vector::rasterize_mask(&boundary, &geographic_grid, render.boundary_burn_mode)?;
        let boundary_mask = algo::downsample_mask(&boundary_mask, render.downsample_factor)?;

        let resampler = Resampler {
            target: &geographic_grid,
            factor: render.downsample_factor,
        };

        let vegetation = match optional_source(&inputs.vegetation_raster) {
            Some(path) => Some(ContinuousLayer::with_fixed_range(
                resampler.apply(&vegetation_index(path, inputs)?)?,
                render.vegetation_range,
            )),
            None => None,
        };

        let (elevation, slope) = match optional_source(&inputs.elevation_raster) {
            Some(path) => {
                let elevation = io::read_band(path, 1)?;
                let slope = algo::slope(&elevation)?;
                (
                    Some(ContinuousLayer::with_percentile_range(resampler.apply(&elevation)?, render.percentile_clip)?),
                    Some(ContinuousLayer::with_percentile_range(resampler.apply(&slope)?, render.percentile_clip)?),
                )
            }
            None => (None, None),
        };

        let wind = match optional_source(&inputs.wind_raster) {
            Some(path) => Some(ContinuousLayer::with_percentile_range(
                resampler.apply(&wind_magnitude(path, inputs)?)?,
                render.percentile_clip,
            )?),
            None => None,
        };

        log::info!("Loaded map layers on grid {grid}");

        Ok(MapLayers {
            grid,
            bounds,
            boundary,
            boundary_mask,
            hazard,
            vegetation,
            elevation,
            slope,
            wind,
        })
    }
}

fn optional_source(path: &Path) -> Option<&Path> {
    if path.exists() {
        Some(path)
    } else {
        log::warn!("{}, the layer is omitted", Error::OptionalSourceMissing(path.to_path_buf()));
        None
    }
}

/// Crops the raster to the extent of the boundary, cells outside of the boundary become nodata
fn clip_to_boundary(raster: &GeoRaster, boundary: &VectorFeatureSet, render: &RenderConfig) -> Result<GeoRaster> {
    let boundary = boundary.reprojected(raster.grid().projection())?;
    let extent = boundary.bounding_box().ok_or(Error::EmptyIntersection)?;

    let cropped = algo::crop_to_bounds(raster, &extent)?;
    let mask = vector::rasterize_mask(&boundary, cropped.grid(), render.boundary_burn_mode)?;
    algo::mask_outside(&cropped, &mask)
}

struct Resampler<'a> {
    target: &'a RasterGrid,
    factor: usize,
}

impl Resampler<'_> {
    fn apply(&self, raster: &GeoRaster) -> Result<GeoRaster> {
        let resampled = algo::reproject(raster, self.target, Kernel::Bilinear)?;
        algo::downsample(&resampled, self.factor)
    }
}

fn band_of(bands: &[Band], band_nr: usize, path: &Path) -> Result<Band> {
    if band_nr == 0 || band_nr > bands.len() {
        return Err(Error::InvalidArgument(format!(
            "Band {band_nr} is not available in {} ({} bands)",
            path.display(),
            bands.len()
        )));
    }

    Ok(bands[band_nr - 1].clone())
}

fn vegetation_index(path: &Path, inputs: &MapLayerConfig) -> Result<GeoRaster> {
    let (grid, bands) = io::read_bands(path)?;
    let red = GeoRaster::new(grid.clone(), band_of(&bands, inputs.red_band, path)?)?;
    let nir = GeoRaster::new(grid, band_of(&bands, inputs.nir_band, path)?)?;
    algo::normalized_difference(&red, &nir)
}

fn wind_magnitude(path: &Path, inputs: &MapLayerConfig) -> Result<GeoRaster> {
    let (grid, bands) = io::read_bands(path)?;
    let u = GeoRaster::new(grid.clone(), band_of(&bands, inputs.wind_u_band, path)?)?;
    let v = GeoRaster::new(grid, band_of(&bands, inputs.wind_v_band, path)?)?;
    algo::magnitude(&u, &v)
}
