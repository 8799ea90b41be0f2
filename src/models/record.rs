//! Input rows and their resolved counterparts.

use geo::{Coord, LineString, MapCoords, Point};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::lrs::FailureReason;

/// Requested output geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryMode {
    /// Always a point at the begin measure
    Point,
    /// Always a line between begin and end measure
    Line,
    /// Point when the end measure is absent, line otherwise
    #[default]
    Both,
}

impl std::fmt::Display for GeometryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryMode::Point => write!(f, "point"),
            GeometryMode::Line => write!(f, "line"),
            GeometryMode::Both => write!(f, "both"),
        }
    }
}

impl FromStr for GeometryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "point" => Ok(GeometryMode::Point),
            "line" => Ok(GeometryMode::Line),
            "both" => Ok(GeometryMode::Both),
            other => Err(format!("unknown geometry mode '{}'", other)),
        }
    }
}

/// Geometry type decided for a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Point,
    Line,
}

/// One row of user data.
///
/// Measures are kept as raw text so that parse failures can be reported per row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InputRecord {
    pub route_id: String,
    pub begin_measure: Option<String>,
    pub end_measure: Option<String>,
    /// Every column of the source row, in source order
    pub attributes: Vec<(String, String)>,
    /// Source columns the route ID and measures were read from
    pub columns: SourceColumns,
}

/// Names of the source columns backing a record's designated fields
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceColumns {
    pub route: Option<String>,
    pub begin: Option<String>,
    pub end: Option<String>,
}

impl InputRecord {
    pub fn new(route_id: impl Into<String>, begin_measure: impl Into<String>) -> Self {
        Self {
            route_id: route_id.into(),
            begin_measure: Some(begin_measure.into()),
            end_measure: None,
            attributes: Vec::new(),
            columns: SourceColumns::default(),
        }
    }

    /// Build a record from numeric measures
    pub fn from_measures(route_id: impl Into<String>, begin: f64, end: Option<f64>) -> Self {
        let mut record = Self::new(route_id, begin.to_string());
        record.end_measure = end.map(|e| e.to_string());
        record
    }

    pub fn with_end(mut self, end_measure: impl Into<String>) -> Self {
        self.end_measure = Some(end_measure.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Look up an attribute by column name.
    ///
    /// Designated columns report the record's current route ID and measures,
    /// so edits made before a re-run show up on export.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.designated_value(name) {
            return Some(value);
        }
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attributes in source order, with designated columns kept current
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.attributes.iter().map(move |(key, value)| {
            let value = self.designated_value(key).unwrap_or(value.as_str());
            (key.as_str(), value)
        })
    }

    fn designated_value(&self, name: &str) -> Option<&str> {
        let is = |column: &Option<String>| column.as_deref() == Some(name);
        if is(&self.columns.route) {
            Some(self.route_id.as_str())
        } else if is(&self.columns.begin) {
            Some(self.begin_measure.as_deref().unwrap_or(""))
        } else if is(&self.columns.end) {
            Some(self.end_measure.as_deref().unwrap_or(""))
        } else {
            None
        }
    }
}

/// A resolved geometry in the network's projected coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedGeometry {
    Point(Point<f64>),
    Line(LineString<f64>),
}

impl ResolvedGeometry {
    pub fn kind(&self) -> OutputKind {
        match self {
            ResolvedGeometry::Point(_) => OutputKind::Point,
            ResolvedGeometry::Line(_) => OutputKind::Line,
        }
    }

    pub fn as_point(&self) -> Option<&Point<f64>> {
        match self {
            ResolvedGeometry::Point(p) => Some(p),
            ResolvedGeometry::Line(_) => None,
        }
    }

    pub fn as_line(&self) -> Option<&LineString<f64>> {
        match self {
            ResolvedGeometry::Line(l) => Some(l),
            ResolvedGeometry::Point(_) => None,
        }
    }

    /// Apply a coordinate transform, e.g. to leave the projected CRS
    pub fn transformed<F>(&self, transform: F) -> Self
    where
        F: Fn(Coord<f64>) -> Coord<f64> + Copy,
    {
        match self {
            ResolvedGeometry::Point(p) => ResolvedGeometry::Point(p.map_coords(transform)),
            ResolvedGeometry::Line(l) => ResolvedGeometry::Line(l.map_coords(transform)),
        }
    }
}

/// An input record with its resolved geometry
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFeature {
    pub record: InputRecord,
    pub geometry: ResolvedGeometry,
}

/// An input record that could not be resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionFailure {
    pub record: InputRecord,
    pub reason: FailureReason,
}

impl ResolutionFailure {
    /// Human readable reason, as surfaced in error reports
    pub fn message(&self) -> String {
        self.reason.to_string()
    }
}
