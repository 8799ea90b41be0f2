//! Route network: features, line merging, projection and the route index.

mod feature;
mod index;
mod merge;
pub mod projection;
mod raw;

pub use feature::RouteFeature;
pub use index::{detect_route_column, normalize_route_id, RouteIndex};
pub use merge::{merge_parts, SegmentShape};
pub use projection::{LocalTangentPlane, Projection, ProjectionKind};
pub use raw::{RawFeature, RawNetwork};
