//! Reference extent table adapter.
//!
//! The authoritative table is a CSV whose headers are matched loosely: a
//! column containing `ROUTE`, one containing `MINIMUM` and `EXTENT`, and one
//! containing `MAXIMUM` and `EXTENT`. Without all three, validation is off.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, info, warn};

use crate::models::{MeasureExtent, ReferenceExtents};
use crate::Result;

/// Positions of the extent columns in a header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtentColumns {
    pub route: usize,
    pub min: usize,
    pub max: usize,
}

/// Locate extent columns by case-insensitive substring match
pub fn detect_extent_columns<'a, I>(headers: I) -> Option<ExtentColumns>
where
    I: IntoIterator<Item = &'a str>,
{
    let upper: Vec<String> = headers.into_iter().map(|h| h.to_uppercase()).collect();

    let min = upper
        .iter()
        .position(|h| h.contains("MINIMUM") && h.contains("EXTENT"))?;
    let max = upper
        .iter()
        .position(|h| h.contains("MAXIMUM") && h.contains("EXTENT"))?;
    let route = upper
        .iter()
        .position(|h| h.contains("ROUTE") && !h.contains("EXTENT"))?;

    Some(ExtentColumns { route, min, max })
}

/// Read extents from CSV. Unreadable rows and rows with a non-numeric bound
/// are skipped.
pub fn read_extents<R: Read>(reader: R) -> Result<ReferenceExtents> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut extents = ReferenceExtents::new();

    let Some(columns) = detect_extent_columns(headers.iter()) else {
        warn!("Reference table has no route/extent columns; measure validation disabled");
        return Ok(extents);
    };

    let mut skipped = 0usize;
    for result in csv_reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                debug!("Skipping unreadable reference row: {}", e);
                skipped += 1;
                continue;
            }
        };

        let route = record.get(columns.route).map(str::trim).unwrap_or("");
        let min = record.get(columns.min).and_then(|v| v.trim().parse::<f64>().ok());
        let max = record.get(columns.max).and_then(|v| v.trim().parse::<f64>().ok());

        match (route, min, max) {
            ("", _, _) => skipped += 1,
            (route, Some(min), Some(max)) if min.is_finite() && max.is_finite() => {
                if !extents.insert(route, MeasureExtent::new(min, max)) {
                    debug!("Duplicate reference row for route {}; keeping the first", route);
                }
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("Skipped {} reference rows with missing or invalid values", skipped);
    }
    info!("Loaded reference extents for {} routes", extents.len());

    Ok(extents)
}

pub fn read_extents_file(path: &Path) -> Result<ReferenceExtents> {
    let file = File::open(path)?;
    read_extents(file)
}

/// Load extents from a local path or an http(s) URL
pub async fn load_extents(source: &str) -> Result<ReferenceExtents> {
    if source.starts_with("http://") || source.starts_with("https://") {
        info!("Fetching reference extents from {}", source);
        let body = reqwest::get(source).await?.error_for_status()?.text().await?;
        read_extents(body.as_bytes())
    } else {
        read_extents_file(Path::new(source))
    }
}
