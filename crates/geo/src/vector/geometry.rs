use geo_types::{Coord, LineString, MultiPolygon, Polygon};

use crate::{CoordinateTransformer, Point, Rect, Result};

pub fn rings(polygon: &Polygon<f64>) -> impl Iterator<Item = &LineString<f64>> {
    std::iter::once(polygon.exterior()).chain(polygon.interiors().iter())
}

pub fn bounding_box(geometry: &MultiPolygon<f64>) -> Option<Rect> {
    Rect::enclosing(
        geometry
            .iter()
            .flat_map(|polygon| polygon.exterior().coords())
            .map(|c| Point::new(c.x, c.y)),
    )
}

/// Even-odd rule over all the rings, holes are excluded
pub fn polygon_contains(polygon: &Polygon<f64>, p: Point) -> bool {
    let mut inside = false;
    for ring in rings(polygon) {
        for line in ring.lines() {
            let (a, b) = (line.start, line.end);
            if (a.y > p.y()) != (b.y > p.y()) {
                let x = a.x + (p.y() - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x() < x {
                    inside = !inside;
                }
            }
        }
    }

    inside
}

/// Liang-Barsky clipping of the segment against the rectangle, touching counts as intersecting
pub fn segment_intersects_rect(a: Coord<f64>, b: Coord<f64>, rect: &Rect) -> bool {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    for (p, q) in [
        (-dx, a.x - rect.min_x()),
        (dx, rect.max_x() - a.x),
        (-dy, a.y - rect.min_y()),
        (dy, rect.max_y() - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return false;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }

            if t0 > t1 {
                return false;
            }
        }
    }

    true
}

/// Exact polygon / rectangle intersection test
pub fn intersects_rect(geometry: &MultiPolygon<f64>, rect: &Rect) -> bool {
    if !bounding_box(geometry).is_some_and(|bbox| bbox.intersects(rect)) {
        return false;
    }

    geometry.iter().any(|polygon| {
        rings(polygon).any(|ring| ring.lines().any(|line| segment_intersects_rect(line.start, line.end, rect)))
            || polygon_contains(polygon, rect.center())
    })
}

fn transform_ring(ring: &LineString<f64>, coord_trans: &CoordinateTransformer) -> Result<LineString<f64>> {
    let coords = ring
        .coords()
        .map(|c| {
            let p = coord_trans.transform_point(Point::new(c.x, c.y))?;
            Ok(Coord { x: p.x(), y: p.y() })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(LineString::new(coords))
}

pub fn transform(geometry: &MultiPolygon<f64>, coord_trans: &CoordinateTransformer) -> Result<MultiPolygon<f64>> {
    let polygons = geometry
        .iter()
        .map(|polygon| {
            let exterior = transform_ring(polygon.exterior(), coord_trans)?;
            let interiors = polygon
                .interiors()
                .iter()
                .map(|ring| transform_ring(ring, coord_trans))
                .collect::<Result<Vec<_>>>()?;
            Ok(Polygon::new(exterior, interiors))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(MultiPolygon::new(polygons))
}

#[cfg(test)]
pub(crate) fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> MultiPolygon<f64> {
    let exterior = LineString::from(vec![(min_x, min_y), (max_x, min_y), (max_x, max_y), (min_x, max_y), (min_x, min_y)]);
    MultiPolygon::new(vec![Polygon::new(exterior, vec![])])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_in_polygon_with_hole() {
        let exterior = LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let hole = LineString::from(vec![(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0)]);
        let polygon = Polygon::new(exterior, vec![hole]);

        assert!(polygon_contains(&polygon, Point::new(1.0, 1.0)));
        assert!(!polygon_contains(&polygon, Point::new(5.0, 5.0)));
        assert!(!polygon_contains(&polygon, Point::new(11.0, 5.0)));
    }

    #[test]
    fn rect_intersection() {
        let geom = rectangle(0.0, 0.0, 10.0, 10.0);
        // overlapping edges
        assert!(intersects_rect(&geom, &Rect::from_bounds(5.0, 5.0, 15.0, 15.0)));
        // rect inside the polygon
        assert!(intersects_rect(&geom, &Rect::from_bounds(2.0, 2.0, 3.0, 3.0)));
        // polygon inside the rect
        assert!(intersects_rect(&geom, &Rect::from_bounds(-5.0, -5.0, 15.0, 15.0)));
        assert!(!intersects_rect(&geom, &Rect::from_bounds(11.0, 11.0, 15.0, 15.0)));
    }

    #[test]
    fn bounding_box_inside_but_no_overlap() {
        // L shaped polygon, the rect sits in the notch
        let exterior = LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 2.0), (2.0, 2.0), (2.0, 10.0), (0.0, 10.0)]);
        let geom = MultiPolygon::new(vec![Polygon::new(exterior, vec![])]);
        assert!(!intersects_rect(&geom, &Rect::from_bounds(5.0, 5.0, 8.0, 8.0)));
    }
}
