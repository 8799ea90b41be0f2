//! Input table reader.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{InputRecord, SourceColumns};
use crate::{LrsError, Result};

/// Names of the designated input columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordColumns {
    pub route_column: String,
    pub begin_column: String,
    pub end_column: Option<String>,
}

impl Default for RecordColumns {
    fn default() -> Self {
        Self {
            route_column: "ROUTE".to_string(),
            begin_column: "BEGIN_MP".to_string(),
            end_column: None,
        }
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name.trim())
        .ok_or_else(|| LrsError::MissingColumn(name.to_string()))
}

/// Read every row of a CSV table as an input record
pub fn read_records<R: Read>(reader: R, columns: &RecordColumns) -> Result<Vec<InputRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let route_idx = column_index(&headers, &columns.route_column)?;
    let begin_idx = column_index(&headers, &columns.begin_column)?;
    let end_idx = columns
        .end_column
        .as_deref()
        .map(|name| column_index(&headers, name))
        .transpose()?;

    let source_columns = SourceColumns {
        route: Some(headers[route_idx].to_string()),
        begin: Some(headers[begin_idx].to_string()),
        end: end_idx.map(|i| headers[i].to_string()),
    };

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let row = result?;

        let attributes = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.to_string(), row.get(i).unwrap_or("").to_string()))
            .collect();

        records.push(InputRecord {
            route_id: row.get(route_idx).unwrap_or("").to_string(),
            begin_measure: row.get(begin_idx).map(str::to_string),
            end_measure: end_idx.and_then(|i| row.get(i)).map(str::to_string),
            attributes,
            columns: source_columns.clone(),
        });
    }

    Ok(records)
}

pub fn read_records_file(path: &Path, columns: &RecordColumns) -> Result<Vec<InputRecord>> {
    let file = File::open(path)?;
    let records = read_records(file, columns)?;
    info!("Loaded {} rows from {}", records.len(), path.display());
    Ok(records)
}
