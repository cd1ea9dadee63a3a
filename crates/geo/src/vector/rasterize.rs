use geo_types::{Coord, MultiPolygon};

use crate::{
    Point, RasterGrid, Result, VectorFeatureSet,
    raster::{Band, BoundaryMask, GeoRaster},
};

use super::geometry;

const SNAP_EPSILON: f64 = 1e-9;

/// Selects the cells that receive the burn value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BurnMode {
    /// Every cell whose area is intersected by a geometry
    #[default]
    AllTouched,
    /// Only cells whose center lies inside a geometry
    CellCenter,
}

/// Burns the features into a raster on `grid`: intersected cells get `foreground`, all the others `fill`.
/// Features in another coordinate system are reprojected to the grid projection first.
pub fn rasterize(features: &VectorFeatureSet, grid: &RasterGrid, foreground: f32, fill: f32) -> Result<GeoRaster> {
    rasterize_with_mode(features, grid, foreground, fill, BurnMode::default())
}

pub fn rasterize_with_mode(features: &VectorFeatureSet, grid: &RasterGrid, foreground: f32, fill: f32, mode: BurnMode) -> Result<GeoRaster> {
    let burned = burn(features, grid, mode)?;
    let band = Band::new(
        grid.size(),
        burned.into_iter().map(|inside| if inside { foreground } else { fill }).collect(),
    )?;

    GeoRaster::new(grid.clone(), band)
}

/// Boundary mask of the features on `grid`
pub fn rasterize_mask(features: &VectorFeatureSet, grid: &RasterGrid, mode: BurnMode) -> Result<BoundaryMask> {
    BoundaryMask::new(grid.size(), burn(features, grid, mode)?)
}

fn burn(features: &VectorFeatureSet, grid: &RasterGrid, mode: BurnMode) -> Result<Vec<bool>> {
    let mut burned = vec![false; grid.size().cell_count()];
    if features.is_empty() || grid.size().is_empty() {
        return Ok(burned);
    }

    let reprojected;
    let features = if features.has_projection(grid.projection()) {
        features
    } else {
        reprojected = features.reprojected(grid.projection())?;
        &reprojected
    };

    let mut burner = Burner {
        rows: grid.rows(),
        cols: grid.columns(),
        cells: &mut burned,
    };

    for geom in features.geometries() {
        let pixel_geom = to_pixel_space(geom, grid);
        burner.fill_cell_centers(&pixel_geom);
        if mode == BurnMode::AllTouched {
            burner.burn_edges(&pixel_geom);
        }
    }

    log::debug!(
        "Rasterized {} features: {} cells burned",
        features.len(),
        burned.iter().filter(|b| **b).count()
    );

    Ok(burned)
}

fn snap(v: f64) -> f64 {
    let rounded = v.round();
    if (v - rounded).abs() < SNAP_EPSILON { rounded } else { v }
}

/// Polygon rings as closed lists of fractional (col, row) positions, non-finite vertices are dropped
fn to_pixel_space(geom: &MultiPolygon<f64>, grid: &RasterGrid) -> Vec<Vec<Vec<Coord<f64>>>> {
    geom.iter()
        .map(|polygon| {
            geometry::rings(polygon)
                .map(|ring| {
                    let mut pixels: Vec<Coord<f64>> = ring
                        .coords()
                        .filter(|c| c.x.is_finite() && c.y.is_finite())
                        .map(|c| {
                            let pixel = grid.pixel_position(Point::new(c.x, c.y));
                            Coord {
                                x: snap(pixel.x()),
                                y: snap(pixel.y()),
                            }
                        })
                        .collect();

                    if let (Some(&first), Some(&last)) = (pixels.first(), pixels.last()) {
                        if first != last {
                            pixels.push(first);
                        }
                    }
                    pixels
                })
                .collect()
        })
        .collect()
}

struct Burner<'a> {
    rows: usize,
    cols: usize,
    cells: &'a mut [bool],
}

impl Burner<'_> {
    fn burn_cols(&mut self, row: usize, first_col: f64, last_col: f64) {
        if !first_col.is_finite() || !last_col.is_finite() {
            return;
        }

        let first = first_col.max(0.0) as usize;
        let last = last_col.min(self.cols as f64 - 1.0);
        if last < 0.0 || first_col > last {
            return;
        }

        let start = row * self.cols;
        self.cells[start + first..=start + last as usize].fill(true);
    }

    /// Scanline fill (even-odd rule) of the cells whose center is inside the polygon
    fn fill_cell_centers(&mut self, polygons: &[Vec<Vec<Coord<f64>>>]) {
        for rings in polygons {
            let mut crossings: Vec<Vec<f64>> = vec![Vec::new(); self.rows];
            for ring in rings {
                for edge in ring.windows(2) {
                    let (a, b) = (edge[0], edge[1]);
                    if a.y == b.y {
                        continue;
                    }

                    let (y_min, y_max) = (a.y.min(b.y), a.y.max(b.y));
                    // rows whose center y (row + 0.5) lies in [y_min, y_max)
                    let first_row = (y_min - 0.5).ceil().max(0.0);
                    let end_row = (y_max - 0.5).ceil().min(self.rows as f64);
                    let mut row = first_row;
                    while row < end_row {
                        let yc = row + 0.5;
                        crossings[row as usize].push(a.x + (yc - a.y) * (b.x - a.x) / (b.y - a.y));
                        row += 1.0;
                    }
                }
            }

            for (row, xs) in crossings.iter_mut().enumerate() {
                xs.sort_by(f64::total_cmp);
                for pair in xs.chunks_exact(2) {
                    // cells whose center x (col + 0.5) lies in [x0, x1)
                    let first_col = (pair[0] - 0.5).ceil();
                    let last_col = (pair[1] - 0.5).ceil() - 1.0;
                    self.burn_cols(row, first_col, last_col);
                }
            }
        }
    }

    /// Marks the cells whose interior is crossed by a ring edge, edges on cell boundaries are ignored
    fn burn_edges(&mut self, polygons: &[Vec<Vec<Coord<f64>>>]) {
        for ring in polygons.iter().flatten() {
            for edge in ring.windows(2) {
                self.burn_segment(edge[0], edge[1]);
            }
        }
    }

    fn burn_segment(&mut self, a: Coord<f64>, b: Coord<f64>) {
        let (y_min, y_max) = (a.y.min(b.y), a.y.max(b.y));
        let (first_row, last_row) = if y_min == y_max {
            if y_min.fract() == 0.0 {
                return;
            }
            (y_min.floor(), y_min.floor())
        } else {
            (y_min.floor(), y_max.ceil() - 1.0)
        };

        let first_row = first_row.max(0.0);
        let last_row = last_row.min(self.rows as f64 - 1.0);
        let mut row = first_row;
        while row <= last_row {
            // part of the segment within the row band
            let (x0, x1) = if a.y == b.y {
                (a.x, b.x)
            } else {
                let x_at = |y: f64| snap(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
                (x_at(row.max(y_min)), x_at((row + 1.0).min(y_max)))
            };

            let (x_min, x_max) = (x0.min(x1), x0.max(x1));
            if x_min == x_max {
                if x_min.fract() != 0.0 {
                    self.burn_cols(row as usize, x_min.floor(), x_min.floor());
                }
            } else {
                self.burn_cols(row as usize, x_min.floor(), x_max.ceil() - 1.0);
            }

            row += 1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GeoTransform, RasterSize, vector::geometry::rectangle};

    fn grid() -> RasterGrid {
        // 5 x 5 cells of 10m, top left at (0, 50)
        RasterGrid::new(
            "EPSG:32718",
            RasterSize::with_rows_cols(5, 5),
            GeoTransform::new([0.0, 10.0, 0.0, 50.0, 0.0, -10.0]),
            Some(0.0),
        )
    }

    fn burned_cells(raster: &GeoRaster) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for row in 0..raster.grid().rows() {
            for col in 0..raster.grid().columns() {
                if raster.band().value(row, col) == 1.0 {
                    cells.push((row, col));
                }
            }
        }
        cells
    }

    #[test]
    fn empty_features_give_fill() -> Result<()> {
        let raster = rasterize(&VectorFeatureSet::empty("EPSG:32718"), &grid(), 1.0, 0.0)?;
        assert!(raster.band().iter().all(|v| v == 0.0));
        assert_eq!(raster.grid(), &grid());
        Ok(())
    }

    #[test]
    fn cell_aligned_rectangle() -> Result<()> {
        // covers rows 1..3 and cols 1..3 exactly, neighbouring cells are only touched at the boundary
        let features = VectorFeatureSet::new("EPSG:32718", vec![rectangle(10.0, 20.0, 30.0, 40.0)]);
        for mode in [BurnMode::AllTouched, BurnMode::CellCenter] {
            let raster = rasterize_with_mode(&features, &grid(), 1.0, 0.0, mode)?;
            assert_eq!(burned_cells(&raster), vec![(1, 1), (1, 2), (2, 1), (2, 2)]);
        }
        Ok(())
    }

    #[test]
    fn small_polygon_inside_a_cell() -> Result<()> {
        let features = VectorFeatureSet::new("EPSG:32718", vec![rectangle(21.0, 21.0, 23.0, 23.0)]);

        let all_touched = rasterize(&features, &grid(), 1.0, 0.0)?;
        assert_eq!(burned_cells(&all_touched), vec![(2, 2)]);

        let centers = rasterize_with_mode(&features, &grid(), 1.0, 0.0, BurnMode::CellCenter)?;
        assert!(burned_cells(&centers).is_empty());
        Ok(())
    }

    #[test]
    fn partially_covered_cells() -> Result<()> {
        // x 12..18 covers part of col 1, y 32..47 covers part of rows 0 and 1
        let features = VectorFeatureSet::new("EPSG:32718", vec![rectangle(12.0, 32.0, 18.0, 47.0)]);
        let raster = rasterize(&features, &grid(), 1.0, 0.0)?;
        assert_eq!(burned_cells(&raster), vec![(0, 1), (1, 1)]);
        Ok(())
    }

    #[test]
    fn overlapping_features_union() -> Result<()> {
        let features = VectorFeatureSet::new(
            "EPSG:32718",
            vec![rectangle(0.0, 40.0, 20.0, 50.0), rectangle(10.0, 40.0, 30.0, 50.0)],
        );
        let raster = rasterize(&features, &grid(), 1.0, 0.0)?;
        assert_eq!(burned_cells(&raster), vec![(0, 0), (0, 1), (0, 2)]);
        Ok(())
    }

    #[test]
    fn features_outside_the_grid() -> Result<()> {
        let features = VectorFeatureSet::new("EPSG:32718", vec![rectangle(-100.0, -100.0, -50.0, -50.0), rectangle(-5.0, 45.0, 5.0, 60.0)]);
        let raster = rasterize(&features, &grid(), 1.0, 0.0)?;
        assert_eq!(burned_cells(&raster), vec![(0, 0)]);
        Ok(())
    }

    #[test]
    fn non_finite_vertices_are_skipped() -> Result<()> {
        use geo_types::{LineString, Polygon};

        let with_nan_vertex = Polygon::new(
            LineString::from(vec![(10.0, 20.0), (30.0, 20.0), (f64::NAN, f64::NAN), (30.0, 40.0), (10.0, 40.0), (10.0, 20.0)]),
            vec![],
        );
        let features = VectorFeatureSet::new("EPSG:32718", vec![MultiPolygon::new(vec![with_nan_vertex])]);
        let raster = rasterize(&features, &grid(), 1.0, 0.0)?;
        assert_eq!(burned_cells(&raster), vec![(1, 1), (1, 2), (2, 1), (2, 2)]);

        let all_nan = Polygon::new(LineString::from(vec![(f64::NAN, f64::NAN); 4]), vec![]);
        let features = VectorFeatureSet::new("EPSG:32718", vec![MultiPolygon::new(vec![all_nan])]);
        for mode in [BurnMode::AllTouched, BurnMode::CellCenter] {
            let raster = rasterize_with_mode(&features, &grid(), 1.0, 0.0, mode)?;
            assert!(burned_cells(&raster).is_empty());
        }
        Ok(())
    }

    #[test]
    fn boundary_mask() -> Result<()> {
        let features = VectorFeatureSet::new("EPSG:32718", vec![rectangle(0.0, 0.0, 50.0, 10.0)]);
        let mask = rasterize_mask(&features, &grid(), BurnMode::CellCenter)?;
        assert_eq!(mask.inside_count(), 5);
        assert!(mask.contains(4, 0));
        assert!(!mask.contains(3, 0));
        Ok(())
    }
}
