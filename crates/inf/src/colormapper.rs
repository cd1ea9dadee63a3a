use crate::Color;
use crate::legend::MappingConfig;

mod categoric;
mod linear;

pub use categoric::ClassificationScheme;
pub use linear::ContinuousColorRamp;

/// Trait for implementing color mappers
pub trait ColorMapper {
    fn color_for_numeric_value(&self, value: f64, config: &MappingConfig) -> Color;
    fn category_count(&self) -> usize;
}
