use crate::error::{ProcessingError, Result};
use crate::utils::constants::MAX_PERCENTILE;

/// Percentiles `0..=100`
pub fn default_percentiles() -> Vec<u32> {
    (0..=MAX_PERCENTILE).collect()
}

pub fn validate_percentiles(percentiles: &[u32]) -> Result<()> {
    if percentiles.is_empty() {
        return Err(ProcessingError::InvalidFormat(
            "at least one percentile is required".to_string(),
        ));
    }
    if let Some(p) = percentiles.iter().find(|&&p| p > MAX_PERCENTILE) {
        return Err(ProcessingError::InvalidFormat(format!(
            "percentile {} is outside [0, {}]",
            p, MAX_PERCENTILE
        )));
    }
    Ok(())
}

/// Percentiles of `values` using linear interpolation between order statistics.
///
/// For percentile `p` the rank is `p / 100 * (n - 1)`; the result lies between
/// the order statistics at the floor and ceiling of that rank. `values` is
/// sorted in place. A NaN anywhere makes every percentile NaN, as does an
/// empty slice.
///
/// # Examples
/// ```
/// use climate_series_processor::processors::percentile::compute_percentiles;
///
/// let mut values = vec![5.0, 1.0, 3.0, 2.0, 4.0];
/// let result = compute_percentiles(&mut values, &[0, 50, 100]);
/// assert_eq!(result, vec![1.0, 3.0, 5.0]);
/// ```
pub fn compute_percentiles(values: &mut [f64], percentiles: &[u32]) -> Vec<f64> {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return vec![f64::NAN; percentiles.len()];
    }

    values.sort_unstable_by(|a, b| a.total_cmp(b));

    percentiles
        .iter()
        .map(|&p| interpolate(values, p as f64))
        .collect()
}

fn interpolate(sorted: &[f64], percentile: f64) -> f64 {
    let rank = percentile / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(sorted.len() - 1);
    let fraction = rank - lower as f64;

    if lower == upper || fraction == 0.0 {
        sorted[lower]
    } else {
        sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
    }
}
