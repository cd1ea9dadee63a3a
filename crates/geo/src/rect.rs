//! Axis aligned rectangles in world coordinates.

use approx::{AbsDiffEq, RelativeEq};

use crate::Point;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    top_left: Point,
    bottom_right: Point,
}

impl Rect {
    /// Rectangle spanned by two arbitrary corner points
    pub fn from_points(p1: Point, p2: Point) -> Self {
        let top_left = Point::new(p1.x().min(p2.x()), p1.y().max(p2.y()));
        let bottom_right = Point::new(p1.x().max(p2.x()), p1.y().min(p2.y()));

        Rect { top_left, bottom_right }
    }

    pub fn from_nw_se(nw: Point, se: Point) -> Self {
        Rect::from_points(nw, se)
    }

    pub fn from_bounds(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Rect::from_points(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// Smallest rectangle containing all the points, `None` for an empty iterator
    pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        points.into_iter().fold(None, |rect: Option<Rect>, p| {
            Some(match rect {
                Some(r) => r.expanded_to(p),
                None => Rect::from_points(p, p),
            })
        })
    }

    pub fn expanded_to(&self, p: Point) -> Rect {
        Rect::from_bounds(
            self.min_x().min(p.x()),
            self.min_y().min(p.y()),
            self.max_x().max(p.x()),
            self.max_y().max(p.y()),
        )
    }

    pub fn union(&self, other: &Rect) -> Rect {
        self.expanded_to(other.top_left).expanded_to(other.bottom_right)
    }

    pub fn width(&self) -> f64 {
        self.bottom_right.x() - self.top_left.x()
    }

    pub fn height(&self) -> f64 {
        self.top_left.y() - self.bottom_right.y()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    pub fn min_x(&self) -> f64 {
        self.top_left.x()
    }

    pub fn max_x(&self) -> f64 {
        self.bottom_right.x()
    }

    pub fn min_y(&self) -> f64 {
        self.bottom_right.y()
    }

    pub fn max_y(&self) -> f64 {
        self.top_left.y()
    }

    pub fn top_left(&self) -> Point {
        self.top_left
    }

    pub fn top_right(&self) -> Point {
        Point::new(self.bottom_right.x(), self.top_left.y())
    }

    pub fn bottom_left(&self) -> Point {
        Point::new(self.top_left.x(), self.bottom_right.y())
    }

    pub fn bottom_right(&self) -> Point {
        self.bottom_right
    }

    pub fn center(&self) -> Point {
        Point::new((self.min_x() + self.max_x()) / 2.0, (self.min_y() + self.max_y()) / 2.0)
    }

    /// True when the point lies inside or on the border of the rectangle
    pub fn contains(&self, p: Point) -> bool {
        p.x() >= self.min_x() && p.x() <= self.max_x() && p.y() >= self.min_y() && p.y() <= self.max_y()
    }

    /// True when the rectangles share at least one point, touching borders count as intersecting
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min_x() <= other.max_x() && self.max_x() >= other.min_x() && self.min_y() <= other.max_y() && self.max_y() >= other.min_y()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }

        Some(Rect::from_bounds(
            self.min_x().max(other.min_x()),
            self.min_y().max(other.min_y()),
            self.max_x().min(other.max_x()),
            self.max_y().min(other.max_y()),
        ))
    }
}

impl AbsDiffEq for Rect {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.top_left.abs_diff_eq(&other.top_left, epsilon) && self.bottom_right.abs_diff_eq(&other.bottom_right, epsilon)
    }
}

impl RelativeEq for Rect {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.top_left.relative_eq(&other.top_left, epsilon, max_relative)
            && self.bottom_right.relative_eq(&other.bottom_right, epsilon, max_relative)
    }
}
