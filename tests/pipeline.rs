use std::fs;

use milepost::batch::resolve_batch;
use milepost::export::{export_results, feature_collection, ERROR_REPORT_FILE};
use milepost::network::{ProjectionKind, RouteIndex};
use milepost::sources::{read_extents, read_network_file, read_records_file, RecordColumns};
use milepost::{BatchResults, FailureReason, MeasureResolver, ResolverConfig};
use serde_json::Value;

const NETWORK: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {"ROUTE": "FI70", "NAME": "Interstate 70"},
      "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [0.05, 0.0], [0.1, 0.0]]}
    },
    {
      "type": "Feature",
      "properties": {"ROUTE": "FI25", "NAME": "Interstate 25"},
      "geometry": {
        "type": "MultiLineString",
        "coordinates": [[[0.0, 0.01], [0.02, 0.01]], [[0.02, 0.01], [0.04, 0.01]]]
      }
    }
  ]
}"#;

const REFERENCE: &str = "Route_Name,Minimum_Extent,Maximum_Extent\nFI70,0,6\nFI25,0,2\n";

const INPUT: &str = "Project,Route,Begin,End
P-1,FI70,1,2
P-2,FI70,1,
P-3,UNKNOWN,1,
P-4,FI70,abc,
P-5,FI25,0.5,1
P-6,FI70,7,
";

/// Degrees of longitude per meter on the equator for the local plane radius
const DEG_PER_METER: f64 = 360.0 / (2.0 * std::f64::consts::PI * 6_371_007.2);

#[test]
fn test_resolve_and_export_from_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let network_path = dir.path().join("network.geojson");
    let input_path = dir.path().join("input.csv");
    fs::write(&network_path, NETWORK).expect("write network");
    fs::write(&input_path, INPUT).expect("write input");

    let raw = read_network_file(&network_path).expect("network");
    assert_eq!(raw.len(), 2);

    let projection = ProjectionKind::LocalTangent.build(raw.bounds());
    let features = raw.into_route_features(None, &projection);
    let extents = read_extents(REFERENCE.as_bytes()).expect("extents");
    let index = RouteIndex::build(features).with_extents(extents);
    assert_eq!(index.route_count(), 2);

    let columns = RecordColumns {
        route_column: "Route".to_string(),
        begin_column: "Begin".to_string(),
        end_column: Some("End".to_string()),
    };
    let records = read_records_file(&input_path, &columns).expect("records");
    let resolver = MeasureResolver::new(&index, ResolverConfig::default());

    let mut results = BatchResults::new();
    results.absorb(resolve_batch(&resolver, &records));

    let summary = results.summary();
    assert_eq!(summary.points, 1);
    assert_eq!(summary.lines, 2);
    assert_eq!(summary.failures, 3);

    let reasons: Vec<&FailureReason> = results.failures.iter().map(|f| &f.reason).collect();
    assert_eq!(
        reasons,
        vec![
            &FailureReason::RouteNotFound("UNKNOWN".into()),
            &FailureReason::InvalidBeginMeasure("abc".into()),
            &FailureReason::BeginAboveMaximum {
                begin: 7.0,
                max: 6.0
            },
        ]
    );

    let out = dir.path().join("out");
    let written = export_results(&out, "Corridor Study", &results, &projection).expect("export");
    assert_eq!(written.len(), 3);

    let points: Value = serde_json::from_str(
        &fs::read_to_string(out.join("Corridor_Study_Points.geojson")).expect("points file"),
    )
    .expect("points json");
    let point = &points["features"][0];
    assert_eq!(point["properties"]["Project"], "P-2");
    let lon = point["geometry"]["coordinates"][0].as_f64().expect("lon");
    let lat = point["geometry"]["coordinates"][1].as_f64().expect("lat");
    assert!((lon - 1609.34 * DEG_PER_METER).abs() < 1e-8);
    assert!(lat.abs() < 1e-9);

    let lines: Value = serde_json::from_str(
        &fs::read_to_string(out.join("Corridor_Study_Lines.geojson")).expect("lines file"),
    )
    .expect("lines json");
    assert_eq!(lines["features"].as_array().map(Vec::len), Some(2));
    assert_eq!(lines["features"][1]["properties"]["Route"], "FI25");
    assert_eq!(lines["features"][1]["geometry"]["type"], "LineString");

    let report = fs::read_to_string(out.join(ERROR_REPORT_FILE)).expect("report");
    let rows: Vec<&str> = report.lines().collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], "Project,Route,Begin,End,Error");
    assert!(rows[1].starts_with("P-3,UNKNOWN,1,,Route Not Found"));
}

#[test]
fn test_rerun_of_edited_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let network_path = dir.path().join("network.geojson");
    fs::write(&network_path, NETWORK).expect("write network");

    let raw = read_network_file(&network_path).expect("network");
    let projection = ProjectionKind::LocalTangent.build(raw.bounds());
    let index = RouteIndex::build(raw.into_route_features(Some("ROUTE"), &projection));

    let columns = RecordColumns {
        route_column: "Route".to_string(),
        begin_column: "Begin".to_string(),
        end_column: Some("End".to_string()),
    };
    let records = milepost::sources::read_records(INPUT.as_bytes(), &columns).expect("records");
    let resolver = MeasureResolver::new(&index, ResolverConfig::default());

    let mut results = BatchResults::new();
    results.absorb(resolve_batch(&resolver, &records));
    // Without reference extents begin 7 clamps onto the end of FI70
    assert_eq!(results.failures.len(), 2);

    let mut retry = results.failed_records();
    for record in &mut retry {
        if record.route_id == "UNKNOWN" {
            record.route_id = "FI70".to_string();
        }
    }
    results.absorb(resolve_batch(&resolver, &retry));

    assert_eq!(results.runs(), 2);
    assert_eq!(results.points.len(), 3);
    assert_eq!(results.failures.len(), 1);
    assert_eq!(
        results.failures[0].reason,
        FailureReason::InvalidBeginMeasure("abc".into())
    );

    let collection =
        serde_json::to_value(feature_collection(&results.points, &projection)).expect("json");
    let fixed = &collection["features"][2]["properties"];
    assert_eq!(fixed["Project"], "P-3");
    assert_eq!(fixed["Route"], "FI70");

    let out = dir.path().join("out");
    export_results(&out, "Retry", &results, &projection).expect("export");
    let report = fs::read_to_string(out.join(ERROR_REPORT_FILE)).expect("report");
    assert!(report.lines().nth(1).is_some_and(|row| row.starts_with("P-4,FI70,abc,,")));
}
