//! Official measure extents per route.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::network::normalize_route_id;

/// Officially valid measure range for a route, independent of its GIS geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasureExtent {
    pub min: f64,
    pub max: f64,
}

impl MeasureExtent {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Inclusive on both bounds
    pub fn contains(&self, measure: f64) -> bool {
        measure >= self.min && measure <= self.max
    }
}

/// Reference table mapping route IDs to their extents.
///
/// An empty table means no route is validated.
#[derive(Debug, Clone, Default)]
pub struct ReferenceExtents {
    entries: HashMap<String, MeasureExtent>,
}

impl ReferenceExtents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an extent, keeping the first entry seen for a route.
    ///
    /// Returns false when the route already had an extent.
    pub fn insert(&mut self, route_id: &str, extent: MeasureExtent) -> bool {
        let key = normalize_route_id(route_id);
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, extent);
        true
    }

    pub fn get(&self, route_id: &str) -> Option<MeasureExtent> {
        self.entries.get(&normalize_route_id(route_id)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
