//! Linear referencing: measure parsing, distance-along-line geometry and the
//! per-record resolver.

mod error;
pub mod linear;
pub mod measure;
mod resolver;

pub use error::FailureReason;
pub use resolver::{MeasureResolver, ResolverConfig};
