pub type Point<T = f64> = geo_types::Point<T>;

pub fn euclidean_distance(p1: Point, p2: Point) -> f64 {
    let delta = p1 - p2;
    delta.x().hypot(delta.y())
}

/// Point at fraction `t` on the segment from `p1` to `p2`
pub fn interpolate(p1: Point, p2: Point, t: f64) -> Point {
    Point::new(inf::interpolate::lerp(p1.x(), p2.x(), t), inf::interpolate::lerp(p1.y(), p2.y(), t))
}
