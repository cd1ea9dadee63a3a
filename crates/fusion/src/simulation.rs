//! Support for displaying the output of the fire spread simulator next to the hazard classes.

use std::path::Path;

use geo::{
    Band, BoundaryMask, Error, GeoRaster, LatLonBounds, RasterGrid, RasterSize, RgbaBuffer,
    crs::epsg,
    raster::{
        algo::{self, Kernel},
        io,
    },
    vector,
};
use inf::{ClassificationScheme, Color, ColorMapper, MappingConfig, color};

use crate::{PipelineConfig, Result};

/// Width of the hazard raster resampled on the boundary extent
pub const HAZARD_RESAMPLE_WIDTH: usize = 700;
const HAZARD_ALPHA: u8 = 200;
/// Stride applied to the simulator frames before display
pub const FRAME_DOWNSAMPLE_FACTOR: usize = 3;
const BURNED_COLOR: Color = Color::rgba(255, 0, 0, 140);

/// Hazard classes resampled on a geographic grid that exactly covers the boundary
#[derive(Debug, Clone)]
pub struct ResampledHazard {
    pub raster: GeoRaster,
    pub boundary_mask: BoundaryMask,
    pub bounds: LatLonBounds,
}

/// Geographic bounds of the simulation topology raster
pub fn topology_bounds(path: &Path) -> Result<LatLonBounds> {
    RasterGrid::from_file(path)?.latlon_bounds()
}

/// Resamples the hazard classes (nearest) on a geographic grid of `width` columns covering the boundary,
/// the row count follows from the aspect ratio of the boundary extent.
/// Cells inside of the boundary without hazard data are assigned the lowest class (0).
pub fn resample_hazard(config: &PipelineConfig, width: usize) -> Result<ResampledHazard> {
    let inputs = &config.map_layers;
    let boundary = vector::io::read(&inputs.boundary)?.reprojected(&epsg::WGS84.to_string())?;
    let extent = boundary.bounding_box().ok_or(Error::EmptyIntersection)?;

    let height = ((width as f64 * extent.height() / extent.width().max(1e-6)) as usize).max(1);
    let grid = RasterGrid::from_bounds(
        epsg::WGS84.to_string(),
        &extent,
        RasterSize::with_rows_cols(height, width),
        Some(f64::NAN),
    )?;

    let hazard = io::read_band(&inputs.hazard_raster, 1)?;
    let mut raster = algo::reproject(&hazard, &grid, Kernel::Nearest)?;
    let boundary_mask = vector::rasterize_mask(&boundary, &grid, config.render.boundary_burn_mode)?;

    for (value, inside) in raster.band_mut().as_mut_slice().iter_mut().zip(boundary_mask.as_slice()) {
        if *inside && value.is_nan() {
            *value = 0.0;
        }
    }

    Ok(ResampledHazard {
        raster,
        boundary_mask,
        bounds: LatLonBounds::from_geographic_rect(&extent),
    })
}

/// Burned area of a simulator frame, anchored on the topology extent
#[derive(Debug, Clone)]
pub struct BurnOverlay {
    pub image: RgbaBuffer,
    pub bounds: LatLonBounds,
}

/// Downsamples the frame by [`FRAME_DOWNSAMPLE_FACTOR`] and draws every cell with a value above 0 in
/// translucent red, the other cells (including nodata) are transparent.
pub fn render_burn_frame(frame: &Band, bounds: LatLonBounds) -> Result<BurnOverlay> {
    let frame = algo::downsample_band(frame, FRAME_DOWNSAMPLE_FACTOR)?;
    let colors = frame
        .iter()
        .map(|value| if value > 0.0 { BURNED_COLOR } else { color::TRANSPARENT });

    Ok(BurnOverlay {
        image: RgbaBuffer::from_colors(frame.size(), colors)?,
        bounds,
    })
}

/// Renders the frame on the geographic bounds of the simulation topology raster
pub fn render_burn_frame_on_topology(frame: &Band, topology: &Path) -> Result<BurnOverlay> {
    render_burn_frame(frame, topology_bounds(topology)?)
}

impl ResampledHazard {
    /// All classes are drawn with a fixed alpha inside of the boundary, classes without a color are black
    pub fn render(&self) -> Result<RgbaBuffer> {
        let scheme = ClassificationScheme::hazard_classes();
        let config = MappingConfig::new(color::TRANSPARENT, color::BLACK);

        let colors = self.raster.band().iter().map(|value| {
            let color = scheme.color_for_numeric_value(value as f64, &config);
            if color.is_transparent() { color } else { color.with_alpha(HAZARD_ALPHA) }
        });

        let mut image = RgbaBuffer::from_colors(self.raster.size(), colors)?;
        image.apply_boundary_mask(&self.boundary_mask)?;
        Ok(image)
    }
}
