//! Milepost - linear referencing resolution for route/measure tables.
//!
//! This library turns records of the form `(route id, begin measure, [end measure])`
//! into point or line geometries by projecting the measures onto route centerlines.
//! The `resolve` binary wires the adapters in [`sources`] to the resolver and
//! writes the results with [`export`].

pub mod batch;
pub mod config;
pub mod export;
pub mod lrs;
pub mod models;
pub mod network;
pub mod sources;

pub use batch::{BatchResults, BatchRun};
pub use lrs::{FailureReason, MeasureResolver, ResolverConfig};
pub use models::{
    GeometryMode, InputRecord, MeasureExtent, MeasureUnit, ReferenceExtents, ResolutionFailure,
    ResolvedFeature, ResolvedGeometry,
};
pub use network::{Projection, RouteFeature, RouteIndex};

/// Errors raised while loading, configuring or exporting a batch.
///
/// Per-record problems are never reported through this type; see [`FailureReason`].
#[derive(Debug, thiserror::Error)]
pub enum LrsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    #[error("Column '{0}' not found")]
    MissingColumn(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LrsError>;
