// Canonical points formatting.
//
// Points are exchanged with the editing UI as strings with exactly three
// digits after the decimal point. The rounding rule is pinned to
// round-half-away-from-zero (`f64::round` on the value scaled by 1000)
// rather than inherited from whatever the display layer happens to do.

/// Round to 3 decimal digits, half away from zero.
pub fn round_points(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 1000.0).round() / 1000.0
}

/// Render a points value in the canonical 3-decimal form.
pub fn format_points(value: f64) -> String {
    format!("{:.3}", round_points(value))
}

/// Parse free-form field text into a committed points value.
///
/// Anything that does not parse as a finite number commits as 0; valid
/// input is rounded to the canonical precision.
pub fn parse_points(text: &str) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => round_points(value),
        _ => 0.0,
    }
}
