//! RGBA composition of raster bands for map overlays.
//!
//! The alpha channel carries the visibility: non finite samples and cells outside of the
//! boundary mask are always fully transparent, the mask is applied as the last step.

use std::{io::BufWriter, ops::RangeInclusive, path::Path};

use inf::{ClassificationScheme, Color, ColorMapPreset, ColorMapper, ContinuousColorRamp, MappingConfig, color};

use crate::{
    Error, RasterSize, Result,
    raster::{Band, BoundaryMask},
};

const CHANNELS: usize = 4;

/// Row major RGBA image with 8 bits per channel
#[derive(Clone, Debug, PartialEq)]
pub struct RgbaBuffer {
    size: RasterSize,
    data: Vec<u8>,
}

impl RgbaBuffer {
    pub fn from_colors(size: RasterSize, colors: impl IntoIterator<Item = Color>) -> Result<Self> {
        let data: Vec<u8> = colors.into_iter().flat_map(|c| c.to_array()).collect();
        if data.len() != size.cell_count() * CHANNELS {
            return Err(Error::InvalidArgument(format!("Color count does not match the image size {size}")));
        }

        Ok(RgbaBuffer { size, data })
    }

    pub fn size(&self) -> RasterSize {
        self.size
    }

    pub fn width(&self) -> usize {
        self.size.cols
    }

    pub fn height(&self) -> usize {
        self.size.rows
    }

    pub fn pixel(&self, row: usize, col: usize) -> [u8; 4] {
        let offset = (row * self.size.cols + col) * CHANNELS;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ]
    }

    pub fn alpha(&self, row: usize, col: usize) -> u8 {
        self.pixel(row, col)[3]
    }

    /// Number of pixels with a non zero alpha
    pub fn visible_count(&self) -> usize {
        self.data.chunks_exact(CHANNELS).filter(|px| px[3] != 0).count()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Pixels outside of the mask become fully transparent
    pub fn apply_boundary_mask(&mut self, mask: &BoundaryMask) -> Result<()> {
        mask.ensure_size(self.size)?;
        for (px, inside) in self.data.chunks_exact_mut(CHANNELS).zip(mask.as_slice()) {
            if !inside {
                px.fill(0);
            }
        }

        Ok(())
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let width = u32::try_from(self.width()).map_err(|_| Error::InvalidArgument("Image too wide".into()))?;
        let height = u32::try_from(self.height()).map_err(|_| Error::InvalidArgument("Image too high".into()))?;

        let mut data: Vec<u8> = Vec::new();

        {
            let w = BufWriter::new(&mut data);
            let mut encoder = png::Encoder::new(w, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_compression(png::Compression::Fast);

            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.data)?;
            writer.finish()?;
        }

        Ok(data)
    }

    pub fn write_png(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.encode_png()?)?;
        Ok(())
    }
}

/// `int(opacity * 255)`
pub fn opacity_to_alpha(opacity: f64) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0) as u8
}

/// Colors the classes within `classes` with the scheme color, all other cells are transparent.
/// Classes within the range that are not part of the scheme are drawn black.
pub fn render_classes(
    band: &Band,
    scheme: &ClassificationScheme,
    classes: RangeInclusive<i64>,
    opacity: f64,
    mask: Option<&BoundaryMask>,
) -> Result<RgbaBuffer> {
    let alpha = opacity_to_alpha(opacity);
    let config = MappingConfig::default();

    let colors = band.iter().map(|value| {
        if !value.is_finite() || value.fract() != 0.0 || !classes.contains(&(value as i64)) {
            return color::TRANSPARENT;
        }

        scheme.color_for_numeric_value(value as f64, &config).with_alpha(alpha)
    });

    let mut rgba = RgbaBuffer::from_colors(band.size(), colors)?;
    if let Some(mask) = mask {
        rgba.apply_boundary_mask(mask)?;
    }

    Ok(rgba)
}

/// Colors the band with a continuous ramp over `[vmin, vmax]`, values outside of the range are clamped.
/// Returns `None` when the value range is unknown (e.g. a band without finite values).
pub fn render_continuous(
    band: &Band,
    vmin: Option<f64>,
    vmax: Option<f64>,
    preset: ColorMapPreset,
    opacity: f64,
    mask: Option<&BoundaryMask>,
) -> Result<Option<RgbaBuffer>> {
    let (Some(vmin), Some(vmax)) = (vmin, vmax) else {
        return Ok(None);
    };

    if !vmin.is_finite() || !vmax.is_finite() {
        log::warn!("No valid value range for the {preset} color ramp ({vmin}, {vmax})");
        return Ok(None);
    }

    let ramp = ContinuousColorRamp::new(vmin, vmax, preset)?;
    Ok(Some(render_color_mapped(band, &ramp, opacity, mask)?))
}

/// Colors every finite sample with the color mapper, non finite samples are transparent
pub fn render_color_mapped(band: &Band, mapper: &impl ColorMapper, opacity: f64, mask: Option<&BoundaryMask>) -> Result<RgbaBuffer> {
    let alpha = opacity_to_alpha(opacity);
    let config = MappingConfig::default();

    let colors = band.iter().map(|value| {
        if value.is_finite() {
            mapper.color_for_numeric_value(value as f64, &config).with_alpha(alpha)
        } else {
            color::TRANSPARENT
        }
    });

    let mut rgba = RgbaBuffer::from_colors(band.size(), colors)?;
    if let Some(mask) = mask {
        rgba.apply_boundary_mask(mask)?;
    }

    Ok(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes_band() -> Band {
        Band::new(RasterSize::with_rows_cols(2, 3), vec![0.0, 1.0, 2.0, 3.0, 4.0, f32::NAN]).unwrap()
    }

    #[test]
    fn alpha_from_opacity() {
        assert_eq!(opacity_to_alpha(0.85), 216);
        assert_eq!(opacity_to_alpha(0.6), 153);
        assert_eq!(opacity_to_alpha(1.0), 255);
        assert_eq!(opacity_to_alpha(0.0), 0);
    }

    #[test]
    fn classified_rendering() -> Result<()> {
        let rgba = render_classes(&classes_band(), &ClassificationScheme::hazard_classes(), 1..=4, 0.85, None)?;
        assert_eq!(rgba.pixel(0, 0), [0, 0, 0, 0]);
        assert_eq!(rgba.pixel(0, 1), [181, 217, 168, 216]);
        assert_eq!(rgba.pixel(0, 2), [255, 235, 170, 216]);
        assert_eq!(rgba.pixel(1, 0), [255, 170, 85, 216]);
        assert_eq!(rgba.pixel(1, 1), [215, 48, 39, 216]);
        assert_eq!(rgba.pixel(1, 2), [0, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn out_of_range_and_unknown_classes() -> Result<()> {
        let band = Band::new(RasterSize::with_rows_cols(1, 3), vec![5.0, 2.5, 7.0]).unwrap();
        let rgba = render_classes(&band, &ClassificationScheme::hazard_classes(), 1..=7, 0.85, None)?;
        // class 5 is in range but not in the scheme
        assert_eq!(rgba.pixel(0, 0), [0, 0, 0, 216]);
        assert_eq!(rgba.alpha(0, 1), 0);

        let rgba = render_classes(&band, &ClassificationScheme::hazard_classes(), 1..=4, 0.85, None)?;
        assert_eq!(rgba.visible_count(), 0);
        Ok(())
    }

    #[test]
    fn masked_rendering() -> Result<()> {
        let band = classes_band();
        let none_inside = BoundaryMask::filled_with(band.size(), false);
        let rgba = render_classes(&band, &ClassificationScheme::hazard_classes(), 0..=4, 1.0, Some(&none_inside))?;
        assert_eq!(rgba.visible_count(), 0);

        let continuous = render_continuous(&band, Some(0.0), Some(4.0), ColorMapPreset::Viridis, 0.6, Some(&none_inside))?;
        assert_eq!(continuous.map(|rgba| rgba.visible_count()), Some(0));

        let wrong_size = BoundaryMask::filled_with(RasterSize::with_rows_cols(1, 1), true);
        assert!(render_classes(&band, &ClassificationScheme::hazard_classes(), 0..=4, 1.0, Some(&wrong_size)).is_err());
        Ok(())
    }

    #[test]
    fn continuous_rendering() -> Result<()> {
        let band = Band::new(RasterSize::with_rows_cols(1, 4), vec![-10.0, 0.0, 10.0, f32::NAN]).unwrap();
        let rgba = render_continuous(&band, Some(0.0), Some(1.0), ColorMapPreset::Magma, 0.6, None)?.unwrap();

        let cmap = inf::ProcessedColorMap::create(ColorMapPreset::Magma);
        let low = cmap.get_color(0.0).with_alpha(153).to_array();
        let high = cmap.get_color(1.0).with_alpha(153).to_array();

        // clamped to the range
        assert_eq!(rgba.pixel(0, 0), low);
        assert_eq!(rgba.pixel(0, 1), low);
        assert_eq!(rgba.pixel(0, 2), high);
        assert_eq!(rgba.pixel(0, 3), [0, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn continuous_without_range() -> Result<()> {
        let band = classes_band();
        assert!(render_continuous(&band, None, Some(1.0), ColorMapPreset::Terrain, 0.6, None)?.is_none());
        assert!(render_continuous(&band, Some(f64::NAN), Some(1.0), ColorMapPreset::Terrain, 0.6, None)?.is_none());
        assert!(render_continuous(&band, Some(2.0), Some(1.0), ColorMapPreset::Terrain, 0.6, None).is_err());
        Ok(())
    }

    #[test]
    fn png_encoding() -> Result<()> {
        let rgba = render_classes(&classes_band(), &ClassificationScheme::hazard_classes(), 1..=4, 0.85, None)?;
        let png = rgba.encode_png()?;

        assert_eq!(&png[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
        // IHDR chunk: width and height as big endian u32
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(u32::from_be_bytes([png[16], png[17], png[18], png[19]]), 3);
        assert_eq!(u32::from_be_bytes([png[20], png[21], png[22], png[23]]), 2);
        Ok(())
    }
}
