//! GeoJSON FeatureCollection reader for route networks.

use std::fs;
use std::path::Path;

use geo::{LineString, MultiLineString};
use geojson::{FeatureCollection, GeoJson};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::network::{RawFeature, RawNetwork};
use crate::{LrsError, Result};

/// Turn a FeatureCollection into a raw network.
///
/// Only LineString and MultiLineString geometries are kept.
pub fn parse_feature_collection(collection: FeatureCollection) -> RawNetwork {
    let mut network = RawNetwork::default();
    let mut skipped = 0usize;

    for feature in collection.features {
        let attributes = feature
            .properties
            .as_ref()
            .map(properties_to_attributes)
            .unwrap_or_default();
        for (column, _) in &attributes {
            if !network.columns.contains(column) {
                network.columns.push(column.clone());
            }
        }

        match feature.geometry.and_then(|geometry| line_geometry(geometry.value)) {
            Some(geometry) => network.features.push(RawFeature {
                attributes,
                geometry,
            }),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Skipped {} features without line geometry", skipped);
    }

    network
}

/// Require a FeatureCollection document
pub fn expect_feature_collection(geojson: GeoJson) -> Result<FeatureCollection> {
    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        _ => Err(LrsError::InvalidGeoJson(
            "expected a FeatureCollection".to_string(),
        )),
    }
}

/// Parse a FeatureCollection from an already decoded JSON document
pub fn feature_collection_from_value(value: Value) -> Result<FeatureCollection> {
    expect_feature_collection(GeoJson::from_json_value(value)?)
}

/// Read a route network from a GeoJSON file
pub fn read_network_file(path: &Path) -> Result<RawNetwork> {
    let content = fs::read_to_string(path)?;
    let collection = expect_feature_collection(content.parse::<GeoJson>()?)?;
    let network = parse_feature_collection(collection);
    info!(
        "Loaded {} route features from {}",
        network.len(),
        path.display()
    );
    Ok(network)
}

/// Coerce a property value to the string used for matching and export
pub fn property_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

fn properties_to_attributes(properties: &Map<String, Value>) -> Vec<(String, String)> {
    properties
        .iter()
        .map(|(key, value)| (key.clone(), property_to_string(value)))
        .collect()
}

fn has_xy(positions: &[geojson::Position]) -> bool {
    positions.iter().all(|position| position.len() >= 2)
}

fn line_geometry(value: geojson::Value) -> Option<MultiLineString<f64>> {
    let well_formed = match &value {
        geojson::Value::LineString(line) => has_xy(line),
        geojson::Value::MultiLineString(lines) => lines.iter().all(|line| has_xy(line)),
        _ => return None,
    };
    if !well_formed {
        return None;
    }

    match value {
        line @ geojson::Value::LineString(_) => LineString::try_from(line)
            .ok()
            .map(|line| MultiLineString::new(vec![line])),
        lines => MultiLineString::try_from(lines).ok(),
    }
}
