//! Route index: route ID to candidate features and reference extents.

use hashbrown::HashMap;
use tracing::{info, warn};

use super::RouteFeature;
use crate::models::{MeasureExtent, ReferenceExtents};

/// Column names tried, in order, when detecting the route ID column
const ROUTE_COLUMN_NAMES: &[&str] = &["ROUTE", "Route", "route", "RouteID", "Route_ID"];

/// Normalize a route identifier for lookup
pub fn normalize_route_id(route_id: &str) -> String {
    route_id.trim().to_string()
}

/// Pick the network column holding the route identifier.
///
/// Tries the known names exactly, then case-insensitively, then falls back to
/// the first column. Returns `None` only when there are no columns.
pub fn detect_route_column(columns: &[String]) -> Option<&str> {
    for name in ROUTE_COLUMN_NAMES {
        if let Some(column) = columns.iter().find(|c| c.as_str() == *name) {
            info!("Auto-selected route column: {}", column);
            return Some(column.as_str());
        }
    }

    for name in ROUTE_COLUMN_NAMES {
        if let Some(column) = columns.iter().find(|c| c.eq_ignore_ascii_case(name)) {
            info!("Auto-selected route column: {}", column);
            return Some(column.as_str());
        }
    }

    let fallback = columns.first()?;
    warn!(
        "Could not find a route column; using '{}' instead",
        fallback
    );
    Some(fallback.as_str())
}

/// Read-only index over a route network snapshot
#[derive(Debug, Default)]
pub struct RouteIndex {
    features: Vec<RouteFeature>,
    /// Route ID to feature positions, in insertion order
    by_route: HashMap<String, Vec<usize>>,
    extents: ReferenceExtents,
}

impl RouteIndex {
    /// Build the index, keeping the order features were delivered in
    pub fn build(features: Vec<RouteFeature>) -> Self {
        let mut by_route: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, feature) in features.iter().enumerate() {
            by_route
                .entry(normalize_route_id(&feature.route_id))
                .or_default()
                .push(i);
        }

        info!(
            "Route index built with {} features across {} routes",
            features.len(),
            by_route.len()
        );

        Self {
            features,
            by_route,
            extents: ReferenceExtents::default(),
        }
    }

    /// Attach reference extents used for measure validation
    pub fn with_extents(mut self, extents: ReferenceExtents) -> Self {
        if !extents.is_empty() {
            info!("Measure validation enabled for {} routes", extents.len());
        }
        self.extents = extents;
        self
    }

    /// Candidate features for a route, in resolution priority order
    pub fn find_segments(&self, route_id: &str) -> Vec<&RouteFeature> {
        self.by_route
            .get(&normalize_route_id(route_id))
            .map(|positions| positions.iter().map(|&i| &self.features[i]).collect())
            .unwrap_or_default()
    }

    /// Official extent for a route, if the reference table has one
    pub fn extent_for(&self, route_id: &str) -> Option<MeasureExtent> {
        self.extents.get(route_id)
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn route_count(&self) -> usize {
        self.by_route.len()
    }
}
