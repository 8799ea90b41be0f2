//! Measure parsing and conversion to distance along a segment.

/// Values treated as a missing end measure
const ABSENT_MARKERS: &[&str] = &["", "nan", "null", "none", "(none)", "na", "n/a"];

/// True when a raw cell carries no measure
pub fn is_absent(raw: Option<&str>) -> bool {
    match raw {
        None => true,
        Some(value) => {
            let value = value.trim().to_lowercase();
            ABSENT_MARKERS.contains(&value.as_str())
        }
    }
}

/// Parse a raw cell as a finite measure
pub fn parse_measure(raw: Option<&str>) -> Option<f64> {
    let value: f64 = raw?.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

/// Distance along the geometry for a measure.
///
/// The measure is made relative to the route's first valid measure and never
/// goes below zero, then scaled into projected units.
pub fn projection_distance(measure: f64, route_min: f64, unit_factor: f64) -> f64 {
    (measure - route_min).max(0.0) * unit_factor
}
