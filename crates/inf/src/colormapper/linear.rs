use crate::colormap::{ColorMapPreset, ProcessedColorMap};
use crate::interpolate::linear_map_to_float;
use crate::legend::MappingConfig;
use crate::{Color, Error, Result};

use super::ColorMapper;

/// Linear color mapper
/// each value gets its color based on the position in the configured value range
#[derive(Clone, Debug)]
pub struct ContinuousColorRamp {
    min: f64,
    max: f64,
    color_map: ProcessedColorMap,
}

impl ContinuousColorRamp {
    pub fn new(min: f64, max: f64, preset: ColorMapPreset) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::InvalidArgument(format!("Color ramp bounds must be finite ({min}, {max})")));
        }

        if min > max {
            return Err(Error::InvalidArgument(format!("Invalid color ramp range: {min} > {max}")));
        }

        Ok(ContinuousColorRamp {
            min,
            max,
            color_map: ProcessedColorMap::create(preset),
        })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn preset(&self) -> ColorMapPreset {
        self.color_map.preset()
    }

    pub fn color_map(&self) -> &ProcessedColorMap {
        &self.color_map
    }

    /// Position of the value in the ramp range, clamped to [0, 1]
    pub fn normalize(&self, value: f64) -> f32 {
        linear_map_to_float::<f64, f32>(value, self.min, self.max)
    }
}

impl ColorMapper for ContinuousColorRamp {
    fn color_for_numeric_value(&self, value: f64, config: &MappingConfig) -> Color {
        if !value.is_finite() {
            return config.nodata_color;
        }

        self.color_map.get_color(self.normalize(value))
    }

    fn category_count(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;

    #[test]
    fn ramp_range() -> Result<()> {
        let ramp = ContinuousColorRamp::new(-1.0, 1.0, ColorMapPreset::RdYlGn)?;
        let config = MappingConfig::default();

        assert_eq!(ramp.normalize(0.0), 0.5);
        assert_eq!(ramp.color_for_numeric_value(-5.0, &config), ramp.color_map().get_color(0.0));
        assert_eq!(ramp.color_for_numeric_value(5.0, &config), ramp.color_map().get_color(1.0));
        assert_eq!(ramp.color_for_numeric_value(f64::NAN, &config), color::TRANSPARENT);
        assert_eq!(ramp.color_for_numeric_value(f64::INFINITY, &config), color::TRANSPARENT);
        Ok(())
    }

    #[test]
    fn invalid_ranges() {
        assert!(ContinuousColorRamp::new(2.0, 1.0, ColorMapPreset::Magma).is_err());
        assert!(ContinuousColorRamp::new(f64::NAN, 1.0, ColorMapPreset::Magma).is_err());
        assert!(ContinuousColorRamp::new(1.0, 1.0, ColorMapPreset::Magma).is_ok());
    }
}
