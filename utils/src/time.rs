//! Time formatting helpers.

/// Format fractional hours the way attendance reports show them (`7.5h`).
pub fn format_hours(hours: f64) -> String {
    format!("{:.1}h", hours.max(0.0))
}
