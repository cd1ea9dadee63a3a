//! Dated fire footprint datasets: discovery, date extraction and aggregation into
//! a cumulative raster and a raster of the most recent dataset.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::{
    Error, RasterGrid, Result, VectorFeatureSet,
    raster::GeoRaster,
    vector::{io, rasterize},
};

const DATE_TOKEN_LENGTH: usize = 8;
const DATE_FORMAT: &str = "%Y%m%d";

pub const BURNED: f32 = 1.0;
pub const NOT_BURNED: f32 = 0.0;

/// Parses the first run of 8 digits in the identifier as a `YYYYMMDD` date
pub fn parse_date_token(identifier: &str) -> Result<NaiveDate> {
    let bytes = identifier.as_bytes();
    let token = bytes
        .windows(DATE_TOKEN_LENGTH)
        .position(|window| window.iter().all(u8::is_ascii_digit))
        .map(|start| &identifier[start..start + DATE_TOKEN_LENGTH])
        .ok_or_else(|| Error::MalformedDate(identifier.to_string()))?;

    NaiveDate::parse_from_str(token, DATE_FORMAT).map_err(|_| Error::MalformedDate(identifier.to_string()))
}

/// The date embedded in the identifier, `NaiveDate::MIN` when there is no valid date token
pub fn date_from_identifier(identifier: &str) -> NaiveDate {
    match parse_date_token(identifier) {
        Ok(date) => date,
        Err(err) => {
            log::warn!("{err}, the dataset is considered the oldest");
            NaiveDate::MIN
        }
    }
}

/// Recursively finds the files in `dir` whose name starts with `prefix` and has the `extension` (case insensitive).
/// The result is sorted to obtain a deterministic processing order.
pub fn discover_datasets(dir: &Path, prefix: &str, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::OptionalSourceMissing(dir.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry.map_err(|err| Error::Runtime(format!("Failed to list {}: {err}", dir.display())))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let name_matches = path.file_name().is_some_and(|name| name.to_string_lossy().starts_with(prefix));
        let ext_matches = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));

        if name_matches && ext_matches {
            paths.push(path.to_path_buf());
        }
    }

    paths.sort();
    log::info!("Found {} datasets in {}", paths.len(), dir.display());
    Ok(paths)
}

/// Reads the datasets and tags them with the date of their file name.
/// Datasets that can not be read are skipped.
pub fn load_datasets(paths: &[PathBuf]) -> Vec<VectorFeatureSet> {
    paths
        .iter()
        .filter_map(|path| match io::read(path) {
            Ok(features) => {
                let name = features.source().unwrap_or_default().to_string();
                Some(features.with_timestamp(date_from_identifier(&name)))
            }
            Err(err) => {
                log::warn!("Skipping dataset {}: {err}", path.display());
                None
            }
        })
        .collect()
}

/// Result of the aggregation of the fire history on a grid
#[derive(Debug, Clone)]
pub struct FireHistory {
    /// Union of all the features that intersect the grid
    pub cumulative: GeoRaster,
    /// Features of the most recent dataset that intersects the grid
    pub most_recent: GeoRaster,
    /// Number of datasets that intersect the grid
    pub contributing: usize,
    pub most_recent_date: Option<NaiveDate>,
    pub most_recent_source: Option<String>,
}

impl FireHistory {
    fn empty(grid: &RasterGrid) -> Self {
        FireHistory {
            cumulative: GeoRaster::filled_with(grid.clone(), NOT_BURNED),
            most_recent: GeoRaster::filled_with(grid.clone(), NOT_BURNED),
            contributing: 0,
            most_recent_date: None,
            most_recent_source: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contributing == 0
    }
}

/// Aggregates dated feature sets on the grid.
///
/// Only the features intersecting the grid extent are kept. The cumulative raster is the union of all of them,
/// the most recent raster contains the dataset with the latest timestamp (the first one in input order on ties).
/// Datasets that can not be reprojected to the grid projection are skipped.
/// When nothing intersects the grid both rasters contain only background values.
pub fn aggregate(datasets: &[VectorFeatureSet], grid: &RasterGrid) -> Result<FireHistory> {
    let area = grid.bounding_box();

    let mut intersecting = Vec::new();
    for dataset in datasets {
        let features = if dataset.has_projection(grid.projection()) {
            dataset.intersecting(&area)
        } else {
            match dataset.reprojected(grid.projection()) {
                Ok(reprojected) => reprojected.intersecting(&area),
                Err(err) => {
                    log::warn!(
                        "Skipping dataset {}: reprojection failed ({err})",
                        dataset.source().unwrap_or("unnamed dataset")
                    );
                    continue;
                }
            }
        };

        if features.is_empty() {
            log::debug!("No intersection with the grid: {}", dataset.source().unwrap_or("unnamed dataset"));
            continue;
        }

        log::info!(
            "Dataset intersects the grid: {} ({} features)",
            dataset.source().unwrap_or("unnamed dataset"),
            features.len()
        );
        intersecting.push(features);
    }

    let Some(merged) = VectorFeatureSet::merged(&intersecting) else {
        log::warn!("{}, generating empty fire rasters", Error::EmptyIntersection);
        return Ok(FireHistory::empty(grid));
    };

    let mut most_recent = &intersecting[0];
    for dataset in &intersecting[1..] {
        if dataset.timestamp() > most_recent.timestamp() {
            most_recent = dataset;
        }
    }

    log::info!(
        "Most recent dataset: {} ({})",
        most_recent.source().unwrap_or("unnamed dataset"),
        most_recent.timestamp().map(|date| date.to_string()).unwrap_or_default()
    );

    Ok(FireHistory {
        cumulative: rasterize(&merged, grid, BURNED, NOT_BURNED)?,
        most_recent: rasterize(most_recent, grid, BURNED, NOT_BURNED)?,
        contributing: intersecting.len(),
        most_recent_date: most_recent.timestamp(),
        most_recent_source: most_recent.source().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GeoTransform, RasterSize, vector::geometry::rectangle};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn grid() -> RasterGrid {
        RasterGrid::new(
            "EPSG:32718",
            RasterSize::with_rows_cols(4, 4),
            GeoTransform::new([0.0, 10.0, 0.0, 40.0, 0.0, -10.0]),
            Some(0.0),
        )
    }

    fn dataset(name: &str, min_x: f64, min_y: f64) -> VectorFeatureSet {
        VectorFeatureSet::new("EPSG:32718", vec![rectangle(min_x, min_y, min_x + 10.0, min_y + 10.0)])
            .with_source(name)
            .with_timestamp(date_from_identifier(name))
    }

    #[test]
    fn date_tokens() {
        assert_eq!(parse_date_token("FireScar_CL-LR_LI_20150601.geojson").unwrap(), date(2015, 6, 1));
        assert_eq!(parse_date_token("20201231").unwrap(), date(2020, 12, 31));
        // the first 8 digits of a longer run
        assert_eq!(parse_date_token("x2010010199").unwrap(), date(2010, 1, 1));
        assert!(matches!(parse_date_token("FireScar_2015.geojson"), Err(Error::MalformedDate(_))));
        assert!(matches!(parse_date_token("FireScar_20151341.geojson"), Err(Error::MalformedDate(_))));
        assert_eq!(date_from_identifier("no date"), NaiveDate::MIN);
    }

    #[test]
    fn cumulative_and_most_recent() -> Result<()> {
        let datasets = vec![
            dataset("FireScar_20100101.geojson", 0.0, 30.0),
            dataset("FireScar_20201231.geojson", 10.0, 20.0),
            dataset("FireScar_20150601.geojson", 20.0, 10.0),
        ];

        let history = aggregate(&datasets, &grid())?;
        assert_eq!(history.contributing, 3);
        assert_eq!(history.most_recent_date, Some(date(2020, 12, 31)));
        assert_eq!(history.most_recent_source.as_deref(), Some("FireScar_20201231.geojson"));

        let cumulative = history.cumulative.band();
        assert_eq!(cumulative.value(0, 0), BURNED);
        assert_eq!(cumulative.value(1, 1), BURNED);
        assert_eq!(cumulative.value(2, 2), BURNED);
        assert_eq!(cumulative.iter().filter(|v| *v == BURNED).count(), 3);

        let recent = history.most_recent.band();
        assert_eq!(recent.value(1, 1), BURNED);
        assert_eq!(recent.iter().filter(|v| *v == BURNED).count(), 1);
        Ok(())
    }

    #[test]
    fn equal_dates_keep_input_order() -> Result<()> {
        let datasets = vec![
            dataset("FireScar_A_20200101.geojson", 0.0, 30.0),
            dataset("FireScar_B_20200101.geojson", 30.0, 0.0),
        ];

        let history = aggregate(&datasets, &grid())?;
        assert_eq!(history.most_recent_source.as_deref(), Some("FireScar_A_20200101.geojson"));
        assert_eq!(history.most_recent.band().value(0, 0), BURNED);
        assert_eq!(history.most_recent.band().value(3, 3), NOT_BURNED);
        Ok(())
    }

    #[test]
    fn non_intersecting_datasets_are_ignored() -> Result<()> {
        let datasets = vec![
            dataset("FireScar_20100101.geojson", 0.0, 30.0),
            dataset("FireScar_20221231.geojson", 1000.0, 1000.0),
        ];

        let history = aggregate(&datasets, &grid())?;
        assert_eq!(history.contributing, 1);
        assert_eq!(history.most_recent_date, Some(date(2010, 1, 1)));
        Ok(())
    }

    #[test]
    fn datasets_in_unknown_projection_are_skipped() -> Result<()> {
        let unknown = VectorFeatureSet::new("EPSG:1", vec![rectangle(0.0, 0.0, 40.0, 40.0)])
            .with_source("FireScar_20221231.geojson")
            .with_timestamp(date(2022, 12, 31));
        let datasets = vec![unknown, dataset("FireScar_20150601.geojson", 20.0, 10.0)];

        let history = aggregate(&datasets, &grid())?;
        assert_eq!(history.contributing, 1);
        assert_eq!(history.most_recent_date, Some(date(2015, 6, 1)));
        assert_eq!(history.most_recent_source.as_deref(), Some("FireScar_20150601.geojson"));
        assert_eq!(history.cumulative.band().iter().filter(|v| *v == BURNED).count(), 1);
        assert_eq!(history.most_recent.band().value(2, 2), BURNED);
        Ok(())
    }

    #[test]
    fn nothing_intersects() -> Result<()> {
        let datasets = vec![dataset("FireScar_20221231.geojson", 1000.0, 1000.0)];
        for history in [aggregate(&datasets, &grid())?, aggregate(&[], &grid())?] {
            assert!(history.is_empty());
            assert!(history.cumulative.band().iter().all(|v| v == NOT_BURNED));
            assert!(history.most_recent.band().iter().all(|v| v == NOT_BURNED));
            assert_eq!(history.cumulative.grid(), &grid());
        }
        Ok(())
    }

    #[test]
    fn discover_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let nested = dir.path().join("2015").join("scars");
        std::fs::create_dir_all(&nested)?;
        std::fs::write(dir.path().join("FireScar_20100101.geojson"), "{}")?;
        std::fs::write(nested.join("FireScar_20150601.GEOJSON"), "{}")?;
        std::fs::write(nested.join("FireScar_20150601.shp"), "")?;
        std::fs::write(nested.join("Other_20150601.geojson"), "{}")?;

        let paths = discover_datasets(dir.path(), "FireScar", "geojson")?;
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.file_name().unwrap().to_string_lossy().starts_with("FireScar")));

        assert!(matches!(
            discover_datasets(&dir.path().join("missing"), "FireScar", "geojson"),
            Err(Error::OptionalSourceMissing(_))
        ));
        Ok(())
    }

    #[test]
    fn unreadable_datasets_are_skipped() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let valid = dir.path().join("FireScar_20150601.geojson");
        std::fs::write(
            &valid,
            r#"{ "type": "Polygon", "coordinates": [[[-73.3, -39.9], [-73.2, -39.9], [-73.2, -39.8], [-73.3, -39.9]]] }"#,
        )?;
        let invalid = dir.path().join("FireScar_20160601.geojson");
        std::fs::write(&invalid, "not json")?;

        let datasets = load_datasets(&[valid, invalid]);
        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets[0].timestamp(), Some(date(2015, 6, 1)));
        Ok(())
    }
}
