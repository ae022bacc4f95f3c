use super::summary::average_speed;

/// `m:ss`, minutes unbounded (e.g. `75:03`)
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() {
        seconds.max(0.0).floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Kilometres with two decimals
pub fn format_km(meters: f64) -> String {
    format!("{:.2}", meters / 1000.0)
}

/// Floors `seconds` like the workout summary, so zero never divides
pub fn speed_kmh(meters: f64, seconds: f64) -> f64 {
    average_speed(meters, seconds) * 3.6
}
