//! Named color ramps and their lookup tables.

use std::str::FromStr;

use crate::{Color, Error, Result};

const LUT_SIZE: usize = 256;

type ControlPoint = (f32, Color);

const RD_YL_GN: [ControlPoint; 11] = [
    (0.0, Color::rgb(0xa5, 0x00, 0x26)),
    (0.1, Color::rgb(0xd7, 0x30, 0x27)),
    (0.2, Color::rgb(0xf4, 0x6d, 0x43)),
    (0.3, Color::rgb(0xfd, 0xae, 0x61)),
    (0.4, Color::rgb(0xfe, 0xe0, 0x8b)),
    (0.5, Color::rgb(0xff, 0xff, 0xbf)),
    (0.6, Color::rgb(0xd9, 0xef, 0x8b)),
    (0.7, Color::rgb(0xa6, 0xd9, 0x6a)),
    (0.8, Color::rgb(0x66, 0xbd, 0x63)),
    (0.9, Color::rgb(0x1a, 0x98, 0x50)),
    (1.0, Color::rgb(0x00, 0x68, 0x37)),
];

const TERRAIN: [ControlPoint; 6] = [
    (0.0, Color::rgb(51, 51, 153)),
    (0.15, Color::rgb(0, 153, 255)),
    (0.25, Color::rgb(0, 204, 102)),
    (0.5, Color::rgb(255, 255, 153)),
    (0.75, Color::rgb(128, 92, 84)),
    (1.0, Color::rgb(255, 255, 255)),
];

const MAGMA: [ControlPoint; 6] = [
    (0.0, Color::rgb(0x00, 0x00, 0x04)),
    (0.2, Color::rgb(0x3b, 0x0f, 0x70)),
    (0.4, Color::rgb(0x8c, 0x29, 0x81)),
    (0.6, Color::rgb(0xde, 0x49, 0x68)),
    (0.8, Color::rgb(0xfe, 0x9f, 0x6d)),
    (1.0, Color::rgb(0xfc, 0xfd, 0xbf)),
];

const VIRIDIS: [ControlPoint; 5] = [
    (0.0, Color::rgb(0x44, 0x01, 0x54)),
    (0.25, Color::rgb(0x3b, 0x52, 0x8b)),
    (0.5, Color::rgb(0x21, 0x91, 0x8c)),
    (0.75, Color::rgb(0x5e, 0xc9, 0x62)),
    (1.0, Color::rgb(0xfd, 0xe7, 0x25)),
];

/// The closed set of color ramps available for continuous layers
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMapPreset {
    /// Diverging red-yellow-green, used for vegetation indices
    RdYlGn,
    Terrain,
    Magma,
    Viridis,
}

impl ColorMapPreset {
    pub const ALL: [ColorMapPreset; 4] = [ColorMapPreset::RdYlGn, ColorMapPreset::Terrain, ColorMapPreset::Magma, ColorMapPreset::Viridis];

    pub fn name(&self) -> &'static str {
        match self {
            ColorMapPreset::RdYlGn => "RdYlGn",
            ColorMapPreset::Terrain => "terrain",
            ColorMapPreset::Magma => "magma",
            ColorMapPreset::Viridis => "viridis",
        }
    }

    /// The interpolation table of the ramp: ascending positions in [0, 1] with the color at that position
    pub fn control_points(&self) -> &'static [(f32, Color)] {
        match self {
            ColorMapPreset::RdYlGn => &RD_YL_GN,
            ColorMapPreset::Terrain => &TERRAIN,
            ColorMapPreset::Magma => &MAGMA,
            ColorMapPreset::Viridis => &VIRIDIS,
        }
    }

    /// Color at `pos` by interpolating between the surrounding control points
    pub fn interpolate(&self, pos: f32) -> Color {
        let points = self.control_points();
        let pos = if pos.is_nan() { 0.0 } else { pos.clamp(0.0, 1.0) };

        let upper_idx = points.iter().position(|(p, _)| *p >= pos).unwrap_or(points.len() - 1);
        if upper_idx == 0 {
            return points[0].1;
        }

        let (lower_pos, lower_color) = points[upper_idx - 1];
        let (upper_pos, upper_color) = points[upper_idx];
        let width = upper_pos - lower_pos;
        if width <= 0.0 {
            return upper_color;
        }

        lower_color.lerp(&upper_color, (pos - lower_pos) / width)
    }
}

impl FromStr for ColorMapPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ColorMapPreset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown color map: {s}")))
    }
}

impl std::fmt::Display for ColorMapPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A color ramp sampled into a fixed size lookup table
#[derive(Clone, Debug)]
pub struct ProcessedColorMap {
    preset: ColorMapPreset,
    cmap: Vec<Color>,
}

impl ProcessedColorMap {
    pub fn create(preset: ColorMapPreset) -> Self {
        let cmap = (0..LUT_SIZE)
            .map(|i| preset.interpolate(i as f32 / (LUT_SIZE - 1) as f32))
            .collect();

        ProcessedColorMap { preset, cmap }
    }

    pub fn preset(&self) -> ColorMapPreset {
        self.preset
    }

    /// Color for a normalized position, values outside [0, 1] map to the edge colors
    pub fn get_color(&self, pos: f32) -> Color {
        let pos = if pos.is_nan() { 0.0 } else { pos.clamp(0.0, 1.0) };
        let index = ((pos * LUT_SIZE as f32) as usize).min(LUT_SIZE - 1);
        self.cmap[index]
    }

    /// Evenly spaced colors along the ramp, e.g. to render a legend gradient
    pub fn gradient(&self, count: usize) -> Vec<Color> {
        match count {
            0 => Vec::new(),
            1 => vec![self.get_color(0.0)],
            _ => (0..count).map(|i| self.get_color(i as f32 / (count - 1) as f32)).collect(),
        }
    }
}

impl From<ColorMapPreset> for ProcessedColorMap {
    fn from(preset: ColorMapPreset) -> Self {
        ProcessedColorMap::create(preset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_points_are_ascending() {
        for preset in ColorMapPreset::ALL {
            let points = preset.control_points();
            assert_eq!(points.first().map(|p| p.0), Some(0.0), "{preset}");
            assert_eq!(points.last().map(|p| p.0), Some(1.0), "{preset}");
            assert!(points.windows(2).all(|w| w[0].0 < w[1].0), "{preset}");
        }
    }

    #[test]
    fn ramp_edges() {
        let cmap = ProcessedColorMap::create(ColorMapPreset::Viridis);
        assert_eq!(cmap.get_color(0.0), Color::rgb(0x44, 0x01, 0x54));
        assert_eq!(cmap.get_color(1.0), Color::rgb(0xfd, 0xe7, 0x25));
        assert_eq!(cmap.get_color(-3.0), cmap.get_color(0.0));
        assert_eq!(cmap.get_color(7.0), cmap.get_color(1.0));
        assert_eq!(cmap.get_color(f32::NAN), cmap.get_color(0.0));
    }

    #[test]
    fn interpolate_at_control_point() {
        assert_eq!(ColorMapPreset::Terrain.interpolate(0.5), Color::rgb(255, 255, 153));
        assert_eq!(ColorMapPreset::RdYlGn.interpolate(0.5), Color::rgb(0xff, 0xff, 0xbf));
    }

    #[test]
    fn interpolate_between_control_points() {
        // halfway between (0, 0, 4) and (59, 15, 112)
        assert_eq!(ColorMapPreset::Magma.interpolate(0.1), Color::rgb(30, 8, 58));
    }

    #[test]
    fn parse_preset_names() {
        assert_eq!("rdylgn".parse::<ColorMapPreset>().unwrap(), ColorMapPreset::RdYlGn);
        assert_eq!("terrain".parse::<ColorMapPreset>().unwrap(), ColorMapPreset::Terrain);
        assert!("jet".parse::<ColorMapPreset>().is_err());
    }

    #[test]
    fn gradient_samples() {
        let cmap = ProcessedColorMap::create(ColorMapPreset::Magma);
        let colors = cmap.gradient(3);
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[0], cmap.get_color(0.0));
        assert_eq!(colors[2], cmap.get_color(1.0));
        assert!(cmap.gradient(0).is_empty());
    }
}
