/// Render a float the way downstream CSV consumers expect: shortest round-trip
/// digits, always with a fractional part (`15.0`, `2.5`), and `nan`/`inf` spelled in lowercase.
/// Magnitudes are never written in exponent notation; whole numbers from `1e16` up
/// lose the `.0` suffix.
///
/// # Examples
/// ```
/// use climate_series_processor::utils::format_float;
///
/// assert_eq!(format_float(15.0), "15.0");
/// assert_eq!(format_float(2.25), "2.25");
/// ```
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Parse a value cell, tolerating surrounding whitespace
pub fn parse_float(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok()
}
