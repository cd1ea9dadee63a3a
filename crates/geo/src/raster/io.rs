//! GeoTIFF reading and writing.
//!
//! Samples are always read as `f32`, cells matching the nodata value of the file are converted to NaN.
//! Only the georeferencing that is needed to reconstruct a `RasterGrid` is supported:
//! pixel scale + tie point or model transformation and an EPSG code in the GeoKey directory.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Seek, Write},
    path::Path,
};

use tiff::{
    decoder::{Decoder, DecodingResult, Limits},
    encoder::{DirectoryEncoder, TiffEncoder, TiffKind, colortype},
    tags::Tag,
};

use crate::{
    Error, GeoTransform, RasterGrid, RasterSize, Result, SpatialReference,
    crs::Epsg,
    raster::{Band, GeoRaster},
};

const KEY_MODEL_TYPE: u16 = 1024;
const KEY_RASTER_TYPE: u16 = 1025;
const KEY_GEOGRAPHIC_TYPE: u16 = 2048;
const KEY_PROJECTED_TYPE: u16 = 3072;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

const PLANAR_CONFIG_SEPARATE: u32 = 2;

fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>> {
    if !path.exists() {
        return Err(Error::SourceNotFound(path.to_path_buf()));
    }

    let reader = BufReader::new(File::open(path)?);
    Ok(Decoder::new(reader)?.with_limits(Limits::unlimited()))
}

/// Reads the grid of a raster file without reading the samples
pub fn read_grid(path: &Path) -> Result<RasterGrid> {
    let mut decoder = open_decoder(path)?;
    let grid = read_grid_from_decoder(&mut decoder)?;
    log::debug!("Grid of {}: {grid}", path.display());
    Ok(grid)
}

/// Reads all the bands of a raster file
pub fn read_bands(path: impl AsRef<Path>) -> Result<(RasterGrid, Vec<Band>)> {
    let path = path.as_ref();
    let mut decoder = open_decoder(path)?;
    let grid = read_grid_from_decoder(&mut decoder)?;

    let band_count = decoder.get_tag_u32(Tag::SamplesPerPixel).unwrap_or(1) as usize;
    if band_count > 1 && decoder.get_tag_u32(Tag::PlanarConfiguration).unwrap_or(1) == PLANAR_CONFIG_SEPARATE {
        return Err(Error::Runtime(format!(
            "Band separated (planar) tiff files are not supported: {}",
            path.display()
        )));
    }

    let samples = decoding_result_to_f32(decoder.read_image()?)?;
    let cell_count = grid.size().cell_count();
    if samples.len() < cell_count * band_count {
        return Err(Error::Runtime(format!(
            "Unexpected amount of samples in {}: expected {} got {}",
            path.display(),
            cell_count * band_count,
            samples.len()
        )));
    }

    let mut bands = Vec::with_capacity(band_count);
    for band_idx in 0..band_count {
        let data: Vec<f32> = samples.iter().skip(band_idx).step_by(band_count).take(cell_count).copied().collect();
        bands.push(Band::new(grid.size(), data)?.with_nodata_as_nan(grid.nodata()));
    }

    Ok((grid, bands))
}

/// Reads a single band, `band_nr` is 1 based
pub fn read_band(path: impl AsRef<Path>, band_nr: usize) -> Result<GeoRaster> {
    let path = path.as_ref();
    let (grid, bands) = read_bands(path)?;
    if band_nr == 0 || band_nr > bands.len() {
        return Err(Error::InvalidArgument(format!(
            "Band {band_nr} is not available in {} ({} bands)",
            path.display(),
            bands.len()
        )));
    }

    let band = bands.into_iter().nth(band_nr - 1).ok_or_else(|| Error::Runtime("Band index error".into()))?;
    GeoRaster::new(grid, band)
}

fn decoding_result_to_f32(result: DecodingResult) -> Result<Vec<f32>> {
    #[allow(unreachable_patterns)]
    let samples = match result {
        DecodingResult::U8(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::U16(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::U32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::I16(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::I32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::F32(data) => data,
        DecodingResult::F64(data) => data.into_iter().map(|v| v as f32).collect(),
        _ => return Err(Error::Runtime("Unsupported tiff sample type".into())),
    };

    Ok(samples)
}

fn read_grid_from_decoder<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<RasterGrid> {
    let (width, height) = decoder.dimensions()?;
    let size = RasterSize::with_rows_cols(height as usize, width as usize);
    let geo_transform = read_geo_transform(decoder)?;
    let projection = read_projection(decoder)?.map(|epsg| epsg.to_string()).unwrap_or_default();
    if projection.is_empty() {
        log::warn!("No EPSG code found in the GeoKey directory");
    }

    Ok(RasterGrid::new(projection, size, geo_transform, read_nodata_value(decoder)))
}

fn read_geo_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<GeoTransform> {
    if let Ok(transform) = decoder.get_tag_f64_vec(Tag::ModelTransformationTag) {
        if transform.len() >= 8 {
            return Ok(GeoTransform::new([
                transform[3],
                transform[0],
                transform[1],
                transform[7],
                transform[4],
                transform[5],
            ]));
        }
    }

    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| Error::Runtime("ModelPixelScale tag not found".into()))?;
    if scale.len() < 2 || scale[0] == 0.0 || scale[1] == 0.0 {
        return Err(Error::Runtime("No cell sizes present in geotiff".into()));
    }

    let tie_points = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| Error::Runtime("ModelTiepoint tag not found".into()))?;
    if tie_points.len() < 6 {
        return Err(Error::Runtime("ModelTiepoint must have 6 values".into()));
    }

    let cell_size_x = scale[0];
    let cell_size_y = -scale[1];
    Ok(GeoTransform::new([
        tie_points[3] - tie_points[0] * cell_size_x,
        cell_size_x,
        0.0,
        tie_points[4] - tie_points[1] * cell_size_y,
        0.0,
        cell_size_y,
    ]))
}

fn read_nodata_value<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    decoder
        .get_tag_ascii_string(Tag::GdalNodata)
        .ok()
        .and_then(|nodata| nodata.trim().trim_end_matches('\0').parse::<f64>().ok())
}

/// The projected EPSG code if present, the geographic one otherwise
fn read_projection<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Option<Epsg>> {
    let Ok(key_dir) = decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag) else {
        return Ok(None);
    };

    if key_dir.len() < 4 {
        return Ok(None);
    }

    if key_dir[0] != 1 {
        return Err(Error::Runtime(format!("Unexpected key directory version: {}", key_dir[0])));
    }

    let mut geographic = None;
    let mut projected = None;

    for key in key_dir[4..].chunks_exact(4) {
        // [key id, tag location (0 = inline), count, value]
        if key[1] != 0 || key[2] != 1 {
            continue;
        }

        match key[0] {
            KEY_GEOGRAPHIC_TYPE => geographic = Some(Epsg::from(key[3])),
            KEY_PROJECTED_TYPE => projected = Some(Epsg::from(key[3])),
            _ => {}
        }
    }

    Ok(projected.or(geographic))
}

/// Writes a single band `f32` GeoTIFF, NaN cells are written as the grid nodata value
pub fn write_raster(path: impl AsRef<Path>, raster: &GeoRaster) -> Result<()> {
    write_bands(path, raster.grid(), &[raster.band()])
}

/// Writes 1, 3 or 4 `f32` bands to a pixel interleaved GeoTIFF
pub fn write_bands(path: impl AsRef<Path>, grid: &RasterGrid, bands: &[&Band]) -> Result<()> {
    if let Some(band) = bands.iter().find(|band| band.size() != grid.size()) {
        return Err(Error::GridMismatch {
            expected: grid.size().to_string(),
            actual: band.size().to_string(),
        });
    }

    let nodata = grid.nodata().map(|nod| nod as f32);
    let mut data = Vec::with_capacity(grid.size().cell_count() * bands.len());
    for idx in 0..grid.size().cell_count() {
        for band in bands {
            let value = band.as_slice()[idx];
            data.push(match nodata {
                Some(nod) if value.is_nan() => nod,
                _ => value,
            });
        }
    }

    let (width, height) = tiff_dimensions(grid)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(File::create(path)?))?;
    match bands.len() {
        1 => {
            let mut image = encoder.new_image::<colortype::Gray32Float>(width, height)?;
            write_georeferencing(image.encoder(), grid)?;
            image.write_data(&data)?;
        }
        3 => {
            let mut image = encoder.new_image::<colortype::RGB32Float>(width, height)?;
            write_georeferencing(image.encoder(), grid)?;
            image.write_data(&data)?;
        }
        4 => {
            let mut image = encoder.new_image::<colortype::RGBA32Float>(width, height)?;
            write_georeferencing(image.encoder(), grid)?;
            image.write_data(&data)?;
        }
        count => {
            return Err(Error::InvalidArgument(format!("Writing {count} bands is not supported")));
        }
    }

    Ok(())
}

/// Writes a single band `u8` GeoTIFF, NaN cells are written as the grid nodata value (0 when absent)
pub fn write_raster_u8(path: impl AsRef<Path>, grid: &RasterGrid, band: &Band) -> Result<()> {
    if band.size() != grid.size() {
        return Err(Error::GridMismatch {
            expected: grid.size().to_string(),
            actual: band.size().to_string(),
        });
    }

    let nodata = grid.nodata().filter(|nod| nod.is_finite()).unwrap_or(0.0).clamp(0.0, 255.0) as u8;
    let data: Vec<u8> = band
        .iter()
        .map(|v| if v.is_nan() { nodata } else { v.round().clamp(0.0, 255.0) as u8 })
        .collect();

    let (width, height) = tiff_dimensions(grid)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(File::create(path)?))?;
    let mut image = encoder.new_image::<colortype::Gray8>(width, height)?;
    write_georeferencing(image.encoder(), grid)?;
    image.write_data(&data)?;
    Ok(())
}

fn tiff_dimensions(grid: &RasterGrid) -> Result<(u32, u32)> {
    let width = u32::try_from(grid.columns()).map_err(|_| Error::InvalidArgument("Raster too wide".into()))?;
    let height = u32::try_from(grid.rows()).map_err(|_| Error::InvalidArgument("Raster too high".into()))?;
    Ok((width, height))
}

fn write_georeferencing<W: Write + Seek, K: TiffKind>(dir_encoder: &mut DirectoryEncoder<W, K>, grid: &RasterGrid) -> Result<()> {
    let gt = grid.geo_transform().coefficients();
    if grid.geo_transform().is_north_up() {
        let pixel_scale = [gt[1].abs(), gt[5].abs(), 0.0];
        dir_encoder.write_tag(Tag::ModelPixelScaleTag, &pixel_scale[..])?;

        // the top left corner of the raster (pixel 0, 0) is tied to the origin of the transform
        let tie_points = [0.0, 0.0, 0.0, gt[0], gt[3], 0.0];
        dir_encoder.write_tag(Tag::ModelTiepointTag, &tie_points[..])?;
    } else {
        let transformation = [
            gt[1], gt[2], 0.0, gt[0], //
            gt[4], gt[5], 0.0, gt[3], //
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        dir_encoder.write_tag(Tag::ModelTransformationTag, &transformation[..])?;
    }

    if let Some(nodata) = grid.nodata() {
        let nodata_str = nodata.to_string();
        dir_encoder.write_tag(Tag::GdalNodata, nodata_str.as_str())?;
    }

    if let Some(geo_keys) = geo_key_directory(grid)? {
        dir_encoder.write_tag(Tag::GeoKeyDirectoryTag, &geo_keys[..])?;
    }

    Ok(())
}

fn geo_key_directory(grid: &RasterGrid) -> Result<Option<Vec<u16>>> {
    let Some(epsg) = grid.epsg() else {
        if !grid.projection().is_empty() {
            log::warn!("Only EPSG projections can be stored in a GeoTIFF, projection '{}' is not written", grid.projection());
        }
        return Ok(None);
    };

    let geographic = SpatialReference::from_epsg(epsg)?.is_geographic();
    let (model_type, crs_key) = if geographic {
        (MODEL_TYPE_GEOGRAPHIC, KEY_GEOGRAPHIC_TYPE)
    } else {
        (MODEL_TYPE_PROJECTED, KEY_PROJECTED_TYPE)
    };

    // header: version, revision, minor revision, number of keys
    #[rustfmt::skip]
    let keys = vec![
        1, 1, 0, 3,
        KEY_MODEL_TYPE, 0, 1, model_type,
        KEY_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA,
        crs_key, 0, 1, epsg.code(),
    ];

    Ok(Some(keys))
}
