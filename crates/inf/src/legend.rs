use crate::{Color, color};

/// Options for the values that can not be mapped by a color mapper
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MappingConfig {
    /// The color of nodata (non finite) values
    pub nodata_color: Color,
    /// The color of classes that are not present in a classification scheme
    pub unmapped_color: Color,
}

impl Default for MappingConfig {
    fn default() -> Self {
        MappingConfig {
            nodata_color: color::TRANSPARENT,
            unmapped_color: color::BLACK,
        }
    }
}

impl MappingConfig {
    pub fn new(nodata_color: Color, unmapped_color: Color) -> Self {
        MappingConfig {
            nodata_color,
            unmapped_color,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Default, Clone, Debug, PartialEq)]
pub struct LegendCategory {
    pub color: Color,
    pub name: String,
}

impl LegendCategory {
    pub fn new(color: Color, name: impl Into<String>) -> Self {
        LegendCategory { color, name: name.into() }
    }
}

/// Visual description of a single layer
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum LegendKind {
    /// Discrete classes, each with its own color and label
    Categories(Vec<(i64, LegendCategory)>),
    /// Continuous gradient with the label of the value range it spans
    Gradient { colors: Vec<Color>, range_label: String },
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    pub title: String,
    pub kind: LegendKind,
}

impl LegendEntry {
    pub fn categories(title: impl Into<String>, categories: Vec<(i64, LegendCategory)>) -> Self {
        LegendEntry {
            title: title.into(),
            kind: LegendKind::Categories(categories),
        }
    }

    pub fn gradient(title: impl Into<String>, colors: Vec<Color>, range_label: impl Into<String>) -> Self {
        LegendEntry {
            title: title.into(),
            kind: LegendKind::Gradient {
                colors,
                range_label: range_label.into(),
            },
        }
    }
}

/// Formats a value range for display, a missing or non finite bound yields `n/a`
pub fn format_range(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) if min.is_finite() && max.is_finite() => format!("{min:.1} - {max:.1}"),
        _ => String::from("n/a"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_labels() {
        assert_eq!(format_range(Some(-1.0), Some(1.0)), "-1.0 - 1.0");
        assert_eq!(format_range(Some(12.345), Some(890.06)), "12.3 - 890.1");
        assert_eq!(format_range(None, Some(1.0)), "n/a");
        assert_eq!(format_range(Some(f64::NAN), Some(1.0)), "n/a");
    }
}
