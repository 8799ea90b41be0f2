use geo::{Euclidean, Length, LineString, MultiLineString};

use super::merge::{merge_parts, SegmentShape};

/// One centerline feature of a route, in projected coordinates.
///
/// A route may be split across several features.
#[derive(Debug, Clone)]
pub struct RouteFeature {
    pub route_id: String,
    /// Geometry as loaded from the network source
    pub geometry: MultiLineString<f64>,
    /// Source attribute columns, in source order
    pub attributes: Vec<(String, String)>,
    shape: SegmentShape,
    length: f64,
}

impl RouteFeature {
    pub fn new(route_id: impl Into<String>, geometry: MultiLineString<f64>) -> Self {
        let shape = merge_parts(&geometry);
        let length = match &shape {
            SegmentShape::Continuous(line) => Euclidean.length(line),
            SegmentShape::Fragmented(parts) => Euclidean.length(parts),
            SegmentShape::Empty => 0.0,
        };

        Self {
            route_id: route_id.into(),
            geometry,
            attributes: Vec::new(),
            shape,
            length: if length.is_finite() { length } else { 0.0 },
        }
    }

    pub fn from_line(route_id: impl Into<String>, line: LineString<f64>) -> Self {
        Self::new(route_id, MultiLineString::new(vec![line]))
    }

    pub fn with_attributes(mut self, attributes: Vec<(String, String)>) -> Self {
        self.attributes = attributes;
        self
    }

    /// The continuous line, if the parts could be joined
    pub fn line(&self) -> Option<&LineString<f64>> {
        self.shape.line()
    }

    /// Total distance along the feature, in projected units
    pub fn length(&self) -> f64 {
        self.length
    }
}
