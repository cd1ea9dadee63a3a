use crate::{Error, Result};

pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
pub const BLACK: Color = Color::rgb(0, 0, 0);
pub const WHITE: Color = Color::rgb(255, 255, 255);

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Color from floating point components in the [0, 1] range, values outside the range are clamped
    pub fn from_unit_rgb(r: f32, g: f32, b: f32) -> Self {
        let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color::rgb(to_byte(r), to_byte(g), to_byte(b))
    }

    /// Parses `#rrggbb` or `#rrggbbaa`, the leading `#` is optional
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.is_ascii() || (digits.len() != 6 && digits.len() != 8) {
            return Err(Error::InvalidColor(hex.to_string()));
        }

        let component = |idx: usize| -> Result<u8> {
            u8::from_str_radix(&digits[idx..idx + 2], 16).map_err(|_| Error::InvalidColor(hex.to_string()))
        };

        let alpha = if digits.len() == 8 { component(6)? } else { 255 };
        Ok(Color::rgba(component(0)?, component(2)?, component(4)?, alpha))
    }

    pub fn to_hex_rgb(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub const fn with_alpha(self, alpha: u8) -> Self {
        Color::rgba(self.r, self.g, self.b, alpha)
    }

    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Linear interpolation between two colors, `t` is clamped to [0, 1]
    pub fn lerp(&self, other: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::rgba(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b), mix(self.a, other.a))
    }

    pub const fn to_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex() {
        assert_eq!(Color::from_hex("#d73027").unwrap(), Color::rgb(215, 48, 39));
        assert_eq!(Color::from_hex("1a9850").unwrap(), Color::rgb(26, 152, 80));
        assert_eq!(Color::from_hex("#00000080").unwrap(), Color::rgba(0, 0, 0, 128));
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
    }

    #[test]
    fn hex_output() {
        assert_eq!(Color::rgb(215, 48, 39).to_hex_rgb(), "#d73027");
    }

    #[test]
    fn lerp_edges() {
        let c1 = Color::rgb(0, 0, 0);
        let c2 = Color::rgb(255, 255, 255);
        assert_eq!(c1.lerp(&c2, 0.0), c1);
        assert_eq!(c1.lerp(&c2, 1.0), c2);
        assert_eq!(c1.lerp(&c2, 0.5), Color::rgb(128, 128, 128));
        assert_eq!(c1.lerp(&c2, 2.0), c2);
    }

    #[test]
    fn unit_components() {
        assert_eq!(Color::from_unit_rgb(0.2, 0.2, 0.6), Color::rgb(51, 51, 153));
        assert_eq!(Color::from_unit_rgb(-1.0, 2.0, 1.0), Color::rgb(0, 255, 255));
    }
}
