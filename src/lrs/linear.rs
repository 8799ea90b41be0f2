//! Distance-along-line operations on planar line strings.

use geo::{Euclidean, InterpolateLine, Length, Line, LineString, Point};

pub fn line_length(line: &LineString<f64>) -> f64 {
    Euclidean.length(line)
}

/// Point at `distance` along the line, clamped to its ends.
///
/// Returns `None` for a line without coordinates or a NaN distance.
pub fn interpolate(line: &LineString<f64>, distance: f64) -> Option<Point<f64>> {
    if distance.is_nan() {
        return None;
    }
    Euclidean.point_at_distance_from_start(line, distance)
}

/// Part of the line between two distances.
///
/// Both distances are clamped to `[0, length]`. Returns `None` when the result
/// would collapse to a single point.
pub fn substring(line: &LineString<f64>, start: f64, end: f64) -> Option<LineString<f64>> {
    let total = line_length(line);
    let start = start.max(0.0).min(total);
    let end = end.max(0.0).min(total);
    if end <= start {
        return None;
    }

    let mut coords = vec![interpolate(line, start)?.0];

    let mut travelled = 0.0;
    for segment in line.lines() {
        travelled += Euclidean.length(&segment);
        if travelled > start && travelled < end {
            coords.push(segment.end);
        }
    }

    coords.push(interpolate(line, end)?.0);
    Some(LineString::new(coords))
}

/// Rebuild the part of the line between two distances by sampling it every
/// `step` units.
///
/// Returns `None` when the sampled endpoints are within `tolerance` of each
/// other.
pub fn resample(
    line: &LineString<f64>,
    start: f64,
    end: f64,
    step: f64,
    tolerance: f64,
) -> Option<LineString<f64>> {
    let total = line_length(line);
    let start = start.max(0.0).min(total);
    let end = end.max(0.0).min(total);

    let mut coords = Vec::new();
    if end > start && step > 0.0 {
        let samples = ((end - start) / step).ceil() as usize;
        for i in 0..samples {
            coords.push(interpolate(line, start + i as f64 * step)?.0);
        }
    }
    coords.push(interpolate(line, end)?.0);

    let first = *coords.first()?;
    let last = *coords.last()?;
    if coords.len() < 2 || Euclidean.length(&Line::new(first, last)) <= tolerance {
        return None;
    }

    Some(LineString::new(coords))
}
