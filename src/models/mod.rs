//! Core data models for linear referencing.

pub mod extent;
pub mod record;
pub mod unit;

pub use extent::{MeasureExtent, ReferenceExtents};
pub use record::{
    GeometryMode, InputRecord, OutputKind, ResolutionFailure, ResolvedFeature, ResolvedGeometry,
    SourceColumns,
};
pub use unit::MeasureUnit;
