use std::collections::BTreeMap;

use crate::{Color, Error, Result, legend::LegendCategory, legend::MappingConfig};

use super::ColorMapper;

/// Categoric color mapper (integer class code → color)
/// Classes are kept ordered by their code, values without a matching class get the unmapped color of the mapping config
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Default, Clone, Debug, PartialEq)]
pub struct ClassificationScheme {
    categories: BTreeMap<i64, LegendCategory>,
}

impl ClassificationScheme {
    pub fn new(categories: BTreeMap<i64, LegendCategory>) -> Self {
        ClassificationScheme { categories }
    }

    /// The five level fire hazard classification (0 = very low, 4 = very high)
    pub fn hazard_classes() -> Self {
        ClassificationScheme::default()
            .with_class(0, Color::rgb(200, 200, 200), "Muy bajo")
            .with_class(1, Color::rgb(181, 217, 168), "Bajo")
            .with_class(2, Color::rgb(255, 235, 170), "Medio")
            .with_class(3, Color::rgb(255, 170, 85), "Alto")
            .with_class(4, Color::rgb(215, 48, 39), "Muy alto")
    }

    pub fn with_class(mut self, code: i64, color: Color, name: impl Into<String>) -> Self {
        self.categories.insert(code, LegendCategory::new(color, name));
        self
    }

    /// Builds a scheme from `(code, hex color)` pairs
    pub fn from_hex_colors(classes: &[(i64, &str)]) -> Result<Self> {
        let mut categories = BTreeMap::new();
        for (code, hex) in classes {
            if categories.insert(*code, LegendCategory::new(Color::from_hex(hex)?, String::default())).is_some() {
                return Err(Error::InvalidArgument(format!("Duplicate class code: {code}")));
            }
        }

        Ok(ClassificationScheme { categories })
    }

    pub fn class_color(&self, code: i64) -> Option<Color> {
        self.categories.get(&code).map(|cat| cat.color)
    }

    pub fn categories(&self) -> impl Iterator<Item = (i64, &LegendCategory)> {
        self.categories.iter().map(|(code, cat)| (*code, cat))
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl ColorMapper for ClassificationScheme {
    fn color_for_numeric_value(&self, value: f64, config: &MappingConfig) -> Color {
        if !value.is_finite() || value.fract() != 0.0 {
            return config.nodata_color;
        }

        self.class_color(value as i64).unwrap_or(config.unmapped_color)
    }

    fn category_count(&self) -> usize {
        self.categories.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;

    #[test]
    fn hazard_class_colors() {
        let scheme = ClassificationScheme::hazard_classes();
        let config = MappingConfig::default();

        assert_eq!(scheme.category_count(), 5);
        assert_eq!(scheme.color_for_numeric_value(1.0, &config), Color::rgb(181, 217, 168));
        assert_eq!(scheme.color_for_numeric_value(4.0, &config), Color::rgb(215, 48, 39));
    }

    #[test]
    fn unmappable_values() {
        let scheme = ClassificationScheme::hazard_classes();
        let config = MappingConfig::default();

        assert_eq!(scheme.color_for_numeric_value(f64::NAN, &config), color::TRANSPARENT);
        assert_eq!(scheme.color_for_numeric_value(2.5, &config), color::TRANSPARENT);
        assert_eq!(scheme.color_for_numeric_value(9.0, &config), color::BLACK);
    }

    #[test]
    fn hex_scheme() -> Result<()> {
        let scheme = ClassificationScheme::from_hex_colors(&[(1, "#ff0000"), (2, "#00ff00")])?;
        assert_eq!(scheme.class_color(2), Some(Color::rgb(0, 255, 0)));
        assert!(ClassificationScheme::from_hex_colors(&[(1, "#ff0000"), (1, "#00ff00")]).is_err());
        Ok(())
    }

    #[test]
    fn categories_are_ordered() {
        let scheme = ClassificationScheme::default()
            .with_class(3, color::WHITE, "c")
            .with_class(1, color::BLACK, "a");
        let codes: Vec<i64> = scheme.categories().map(|(code, _)| code).collect();
        assert_eq!(codes, vec![1, 3]);
    }
}
