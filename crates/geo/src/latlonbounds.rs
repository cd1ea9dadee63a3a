use crate::{Point, Rect};

/// Geographic extent in degrees, used to anchor overlays on a web map
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLonBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl LatLonBounds {
    /// Bounds of a rectangle in geographic coordinates (x = longitude, y = latitude)
    pub fn from_geographic_rect(rect: &Rect) -> Self {
        LatLonBounds {
            south: rect.min_y(),
            west: rect.min_x(),
            north: rect.max_y(),
            east: rect.max_x(),
        }
    }

    /// `[latitude, longitude]` of the south west corner
    pub fn south_west(&self) -> [f64; 2] {
        [self.south, self.west]
    }

    /// `[latitude, longitude]` of the north east corner
    pub fn north_east(&self) -> [f64; 2] {
        [self.north, self.east]
    }

    /// `[[south, west], [north, east]]`, the corner pair layout web map image overlays expect
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [self.south_west(), self.north_east()]
    }

    /// `[latitude, longitude]` of the center
    pub fn center(&self) -> [f64; 2] {
        [(self.south + self.north) / 2.0, (self.west + self.east) / 2.0]
    }

    pub fn to_rect(&self) -> Rect {
        Rect::from_points(Point::new(self.west, self.south), Point::new(self.east, self.north))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_pairs() {
        let bounds = LatLonBounds::from_geographic_rect(&Rect::from_bounds(-73.5, -40.0, -73.0, -39.5));
        assert_eq!(bounds.corners(), [[-40.0, -73.5], [-39.5, -73.0]]);
        assert_eq!(bounds.center(), [-39.75, -73.25]);
        assert_eq!(bounds.to_rect(), Rect::from_bounds(-73.5, -40.0, -73.0, -39.5));
    }
}
