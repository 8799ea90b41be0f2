//! Route network snapshot as delivered by a provider, before indexing.

use geo::{BoundingRect, Coord, LineString, MapCoords, MultiLineString, Rect};
use tracing::{debug, warn};

use super::index::detect_route_column;
use super::{Projection, RouteFeature};

/// A feature with its attributes and unprojected geometry
#[derive(Debug, Clone)]
pub struct RawFeature {
    pub attributes: Vec<(String, String)>,
    pub geometry: MultiLineString<f64>,
}

impl RawFeature {
    pub fn attribute(&self, column: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == column)
            .map(|(_, value)| value.as_str())
    }
}

/// A whole network snapshot in provider coordinates
#[derive(Debug, Clone, Default)]
pub struct RawNetwork {
    /// Attribute columns in the provider's order
    pub columns: Vec<String>,
    pub features: Vec<RawFeature>,
}

impl RawNetwork {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Append another page of features, keeping column order
    pub fn extend(&mut self, other: RawNetwork) {
        for column in other.columns {
            if !self.columns.contains(&column) {
                self.columns.push(column);
            }
        }
        self.features.extend(other.features);
    }

    /// Bounding box over all features
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.features
            .iter()
            .filter_map(|f| f.geometry.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    Coord {
                        x: a.min().x.min(b.min().x),
                        y: a.min().y.min(b.min().y),
                    },
                    Coord {
                        x: a.max().x.max(b.max().x),
                        y: a.max().y.max(b.max().y),
                    },
                )
            })
    }

    /// Project every feature and key it by the route column.
    ///
    /// `route_column` overrides detection. Features with non-finite coordinates
    /// or without a value in the route column are skipped.
    pub fn into_route_features(
        self,
        route_column: Option<&str>,
        projection: &Projection,
    ) -> Vec<RouteFeature> {
        let column = match route_column {
            Some(c) => Some(c.to_string()),
            None => detect_route_column(&self.columns).map(str::to_string),
        };
        let Some(column) = column else {
            warn!("Route network has no attribute columns; no features can be keyed");
            return Vec::new();
        };

        let mut skipped = 0usize;
        let mut features = Vec::with_capacity(self.features.len());

        for raw in self.features {
            let route_id = match raw.attribute(&column) {
                Some(id) if !id.trim().is_empty() => super::normalize_route_id(id),
                _ => {
                    skipped += 1;
                    continue;
                }
            };

            if !has_finite_coords(&raw.geometry) {
                debug!("Skipping feature of route {} with non-finite coordinates", route_id);
                skipped += 1;
                continue;
            }

            let projected: MultiLineString<f64> = MultiLineString::new(
                raw.geometry
                    .0
                    .iter()
                    .map(|line: &LineString<f64>| line.map_coords(|c| projection.forward(c)))
                    .collect(),
            );

            features.push(RouteFeature::new(route_id, projected).with_attributes(raw.attributes));
        }

        if skipped > 0 {
            warn!(
                "Skipped {} route features without a '{}' value or with invalid coordinates",
                skipped, column
            );
        }

        features
    }
}

fn has_finite_coords(geometry: &MultiLineString<f64>) -> bool {
    geometry
        .0
        .iter()
        .flat_map(|line| line.0.iter())
        .all(|c| c.x.is_finite() && c.y.is_finite())
}
