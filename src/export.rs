//! Writes the three result collections for downstream consumers.
//!
//! Points and lines become GeoJSON FeatureCollections in WGS84 with the
//! original attributes as properties. Failures become a CSV error report with
//! an extra `Error` column.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use geojson::{Feature, FeatureCollection, Geometry};
use serde_json::{Map, Value};
use tracing::info;

use crate::batch::BatchResults;
use crate::models::{ResolutionFailure, ResolvedFeature, ResolvedGeometry};
use crate::network::Projection;
use crate::Result;

pub const ERROR_REPORT_FILE: &str = "Error_Report.csv";

fn to_geojson_feature(feature: &ResolvedFeature, projection: &Projection) -> Feature {
    let properties: Map<String, Value> = feature
        .record
        .properties()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();

    let value = match feature.geometry.transformed(|c| projection.inverse(c)) {
        ResolvedGeometry::Point(point) => geojson::Value::from(&point),
        ResolvedGeometry::Line(line) => geojson::Value::from(&line),
    };

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Build a FeatureCollection, unprojecting geometries with `projection`
pub fn feature_collection(features: &[ResolvedFeature], projection: &Projection) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: features
            .iter()
            .map(|feature| to_geojson_feature(feature, projection))
            .collect(),
        foreign_members: None,
    }
}

pub fn write_geojson(path: &Path, features: &[ResolvedFeature], projection: &Projection) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer(file, &feature_collection(features, projection))?;
    Ok(())
}

/// Write failures with their original columns plus `Error`
pub fn write_error_report(path: &Path, failures: &[ResolutionFailure]) -> Result<()> {
    // Union of columns in first-seen order; rows may come from different runs
    let mut columns: Vec<&str> = Vec::new();
    for failure in failures {
        for (name, _) in &failure.record.attributes {
            if !columns.contains(&name.as_str()) {
                columns.push(name);
            }
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(columns.iter().copied().chain(std::iter::once("Error")))?;

    for failure in failures {
        let message = failure.message();
        let row = columns
            .iter()
            .map(|c| failure.record.attribute(c).unwrap_or(""))
            .chain(std::iter::once(message.as_str()));
        writer.write_record(row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write every non-empty collection into `dir`, returning the files written
pub fn export_results(
    dir: &Path,
    name: &str,
    results: &BatchResults,
    projection: &Projection,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let name = name.replace(' ', "_");
    let mut written = Vec::new();

    if !results.points.is_empty() {
        let path = dir.join(format!("{}_Points.geojson", name));
        write_geojson(&path, &results.points, projection)?;
        written.push(path);
    }

    if !results.lines.is_empty() {
        let path = dir.join(format!("{}_Lines.geojson", name));
        write_geojson(&path, &results.lines, projection)?;
        written.push(path);
    }

    if !results.failures.is_empty() {
        let path = dir.join(ERROR_REPORT_FILE);
        write_error_report(&path, &results.failures)?;
        written.push(path);
    }

    for path in &written {
        info!("Wrote {}", path.display());
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lrs::FailureReason;
    use crate::models::InputRecord;
    use geo::{line_string, Point};
    use serde_json::json;

    #[test]
    fn test_point_collection() {
        let feature = ResolvedFeature {
            record: InputRecord::new("FI70", "1").with_attribute("Project", "A-1"),
            geometry: ResolvedGeometry::Point(Point::new(10.0, 20.0)),
        };
        let value = serde_json::to_value(feature_collection(&[feature], &Projection::Identity))
            .expect("json");

        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["properties"]["Project"], "A-1");
        assert_eq!(value["features"][0]["geometry"]["type"], "Point");
        assert_eq!(value["features"][0]["geometry"]["coordinates"], json!([10.0, 20.0]));
    }

    #[test]
    fn test_line_collection_is_unprojected() {
        let feature = ResolvedFeature {
            record: InputRecord::new("FI70", "1"),
            geometry: ResolvedGeometry::Line(line_string![(x: 0.0, y: 0.0), (x: 20_037_508.342_789_244, y: 0.0)]),
        };
        let value = serde_json::to_value(feature_collection(&[feature], &Projection::WebMercator))
            .expect("json");
        let end = &value["features"][0]["geometry"]["coordinates"][1];
        assert!((end[0].as_f64().unwrap_or_default() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_error_report_columns() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(ERROR_REPORT_FILE);
        let failures = vec![
            ResolutionFailure {
                record: InputRecord::new("X", "1")
                    .with_attribute("Route", "X")
                    .with_attribute("Begin", "1"),
                reason: FailureReason::RouteNotFound("X".into()),
            },
            ResolutionFailure {
                record: InputRecord::new("FI70", "q")
                    .with_attribute("Route", "FI70")
                    .with_attribute("Begin", "q")
                    .with_attribute("Note", "typo"),
                reason: FailureReason::InvalidBeginMeasure("q".into()),
            },
        ];

        write_error_report(&path, &failures).expect("report");
        let content = std::fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "Route,Begin,Note,Error");
        assert!(lines[1].starts_with("X,1,,Route Not Found"));
        assert!(lines[2].starts_with("FI70,q,typo,Invalid Begin Measure"));
    }
}
