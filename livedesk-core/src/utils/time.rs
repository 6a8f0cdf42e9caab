/// Spells out a duration, e.g. `1 days, 2 hours, 5 seconds`.
/// Zero-valued units are skipped; a zero duration reads `0 seconds`.
pub fn to_readable_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.round() as u64
    } else {
        0
    };

    let units = [
        (total / 86_400, "days"),
        ((total % 86_400) / 3_600, "hours"),
        ((total % 3_600) / 60, "minutes"),
        (total % 60, "seconds"),
    ];

    let parts: Vec<String> = units
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value} {unit}"))
        .collect();

    if parts.is_empty() {
        "0 seconds".to_string()
    } else {
        parts.join(", ")
    }
}
