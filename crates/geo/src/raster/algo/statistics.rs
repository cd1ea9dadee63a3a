use std::cmp::Ordering;

use crate::{Error, Result, raster::Band};

fn sorted_quantiles(data: &[f32], quantile_vals: &[f64]) -> Vec<f64> {
    let len = data.len() as f64;

    quantile_vals
        .iter()
        .map(|&q| {
            let pos = q * (len - 1.0);
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;

            if lower == upper {
                data[lower] as f64
            } else {
                let weight = pos - lower as f64;
                data[lower] as f64 * (1.0 - weight) + data[upper] as f64 * weight
            }
        })
        .collect()
}

/// Quantiles (0..=1) of the finite samples of the band with linear interpolation between the closest ranks.
/// Returns `None` when the band contains no finite samples.
pub fn nan_percentiles(band: &Band, quantile_vals: &[f64]) -> Result<Option<Vec<f64>>> {
    if quantile_vals.iter().any(|&q| !(0.0..=1.0).contains(&q)) {
        return Err(Error::InvalidArgument("Quantile values must be between 0 and 1".to_string()));
    }

    let mut data: Vec<f32> = band.iter_values().collect();
    if data.is_empty() {
        return Ok(None);
    }

    data.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Ok(Some(sorted_quantiles(&data, quantile_vals)))
}

pub fn nan_percentile(band: &Band, quantile: f64) -> Result<Option<f64>> {
    Ok(nan_percentiles(band, &[quantile])?.and_then(|values| values.first().copied()))
}

/// The (low, high) quantile pair used as the value range of a continuous color ramp
pub fn percentile_range(band: &Band, low: f64, high: f64) -> Result<Option<(f64, f64)>> {
    if low > high {
        return Err(Error::InvalidArgument(format!("Invalid percentile range: {low} > {high}")));
    }

    Ok(nan_percentiles(band, &[low, high])?.map(|values| (values[0], values[1])))
}
