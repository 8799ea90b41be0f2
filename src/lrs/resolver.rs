//! Measure resolver: turns a record's measures into a point or line on one of
//! its route's candidate segments.
//!
//! Per record the steps are:
//! 1. look up candidate segments for the route
//! 2. parse measures and decide between point and line output
//! 3. validate against the route's reference extent, if any
//! 4. try the candidates in index order; the first usable geometry wins

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::linear::{interpolate, line_length, resample, substring};
use super::measure::{is_absent, parse_measure, projection_distance};
use super::FailureReason;
use crate::models::{
    GeometryMode, InputRecord, MeasureExtent, MeasureUnit, OutputKind, ResolutionFailure,
    ResolvedFeature, ResolvedGeometry,
};
use crate::network::{normalize_route_id, RouteFeature, RouteIndex};

/// Tuning for a resolution run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub mode: GeometryMode,
    /// Input measure units to projected distance units
    pub unit_factor: f64,
    /// Shortest accepted line, in distance units. Also the endpoint tolerance
    /// for resampled lines.
    pub min_line_length: f64,
    /// How far past a segment's end the begin distance may fall and still be
    /// resampled, in distance units
    pub end_slack: f64,
    /// Sample spacing for resampled lines, in distance units
    pub resample_step: f64,
    /// Allowance above the reference maximum for end measures, in measure units
    pub extent_tolerance: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            mode: GeometryMode::Both,
            unit_factor: MeasureUnit::Miles.factor(),
            min_line_length: 0.1,
            end_slack: 50.0,
            resample_step: 10.0,
            extent_tolerance: 0.1,
        }
    }
}

impl ResolverConfig {
    pub fn with_mode(mut self, mode: GeometryMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_unit_factor(mut self, unit_factor: f64) -> Self {
        self.unit_factor = unit_factor;
        self
    }
}

/// Resolves records against a read-only route index
#[derive(Debug, Clone, Copy)]
pub struct MeasureResolver<'a> {
    index: &'a RouteIndex,
    config: ResolverConfig,
}

impl<'a> MeasureResolver<'a> {
    pub fn new(index: &'a RouteIndex, config: ResolverConfig) -> Self {
        Self { index, config }
    }

    /// Resolve one record, keeping the record on either side of the result
    pub fn resolve(&self, record: &InputRecord) -> Result<ResolvedFeature, ResolutionFailure> {
        match self.resolve_geometry(record) {
            Ok(geometry) => Ok(ResolvedFeature {
                record: record.clone(),
                geometry,
            }),
            Err(reason) => {
                debug!("Route {}: {}", record.route_id, reason);
                Err(ResolutionFailure {
                    record: record.clone(),
                    reason,
                })
            }
        }
    }

    /// Output type for a record, decided before any geometry work
    pub fn output_kind(&self, record: &InputRecord) -> OutputKind {
        match self.config.mode {
            GeometryMode::Point => OutputKind::Point,
            GeometryMode::Line => OutputKind::Line,
            GeometryMode::Both => {
                if is_absent(record.end_measure.as_deref()) {
                    OutputKind::Point
                } else {
                    OutputKind::Line
                }
            }
        }
    }

    pub fn resolve_geometry(&self, record: &InputRecord) -> Result<ResolvedGeometry, FailureReason> {
        let segments = self.index.find_segments(&record.route_id);
        if segments.is_empty() {
            return Err(FailureReason::RouteNotFound(normalize_route_id(
                &record.route_id,
            )));
        }

        let begin = parse_measure(record.begin_measure.as_deref()).ok_or_else(|| {
            FailureReason::InvalidBeginMeasure(record.begin_measure.clone().unwrap_or_default())
        })?;

        let end = match self.output_kind(record) {
            OutputKind::Point => None,
            OutputKind::Line => Some(parse_measure(record.end_measure.as_deref()).ok_or_else(
                || FailureReason::InvalidEndMeasure(record.end_measure.clone().unwrap_or_default()),
            )?),
        };

        let extent = self.index.extent_for(&record.route_id);
        if let Some(extent) = extent {
            self.check_extent(begin, end, extent)?;
        }

        // Checked on the raw values so messages carry the user's measures
        if let Some(end) = end {
            if begin == end {
                return Err(FailureReason::BeginEqualsEnd(begin));
            }
            if begin > end {
                return Err(FailureReason::EndBeforeBegin { begin, end });
            }
        }

        let route_min = extent.map(|e| e.min).unwrap_or(0.0);
        let begin_distance = projection_distance(begin, route_min, self.config.unit_factor);

        match end {
            None => locate_point(&segments, begin_distance),
            Some(end) => {
                let end_distance = projection_distance(end, route_min, self.config.unit_factor);
                self.locate_line(&segments, begin_distance, end_distance)
            }
        }
    }

    fn check_extent(
        &self,
        begin: f64,
        end: Option<f64>,
        extent: MeasureExtent,
    ) -> Result<(), FailureReason> {
        if !extent.contains(begin) {
            return Err(if begin < extent.min {
                FailureReason::BeginBelowMinimum {
                    begin,
                    min: extent.min,
                }
            } else {
                FailureReason::BeginAboveMaximum {
                    begin,
                    max: extent.max,
                }
            });
        }
        if let Some(end) = end {
            if end > extent.max + self.config.extent_tolerance {
                return Err(FailureReason::EndAboveMaximum {
                    end,
                    max: extent.max,
                });
            }
        }
        Ok(())
    }

    /// Direct extraction first, resampling when the begin falls near the
    /// segment's end
    fn locate_line(
        &self,
        segments: &[&RouteFeature],
        begin_distance: f64,
        end_distance: f64,
    ) -> Result<ResolvedGeometry, FailureReason> {
        if segments.iter().all(|s| s.line().is_none()) {
            return Err(FailureReason::EmptyResult);
        }

        for segment in segments {
            let Some(line) = segment.line() else {
                continue;
            };

            if let Some(part) = substring(line, begin_distance, end_distance) {
                if line_length(&part) > self.config.min_line_length {
                    return Ok(ResolvedGeometry::Line(part));
                }
            }

            if begin_distance <= segment.length() + self.config.end_slack {
                if let Some(part) = resample(
                    line,
                    begin_distance,
                    end_distance,
                    self.config.resample_step,
                    self.config.min_line_length,
                ) {
                    debug!(
                        "Resampled line for route {} between {:.1} and {:.1}",
                        segment.route_id, begin_distance, end_distance
                    );
                    return Ok(ResolvedGeometry::Line(part));
                }
            }
        }

        Err(FailureReason::GeometryGap)
    }
}

/// First candidate long enough wins; otherwise clamp to the end of the last one
fn locate_point(segments: &[&RouteFeature], distance: f64) -> Result<ResolvedGeometry, FailureReason> {
    if segments.iter().all(|s| s.line().is_none()) {
        return Err(FailureReason::EmptyResult);
    }

    for segment in segments {
        let Some(line) = segment.line() else {
            continue;
        };
        if distance <= segment.length() {
            if let Some(point) = interpolate(line, distance) {
                return Ok(ResolvedGeometry::Point(point));
            }
        }
    }

    // TODO: make the clamp opt-out; it hides measures past the end of the mapped route
    let last = segments
        .last()
        .and_then(|segment| segment.line().map(|line| (segment, line)));

    match last {
        Some((segment, line)) => {
            let clamped = distance.min(segment.length());
            debug!(
                "Distance {:.1} beyond all segments of route {}; clamped to {:.1}",
                distance, segment.route_id, clamped
            );
            interpolate(line, clamped)
                .map(ResolvedGeometry::Point)
                .ok_or(FailureReason::MeasureOutOfRange)
        }
        None => Err(FailureReason::MeasureOutOfRange),
    }
}
