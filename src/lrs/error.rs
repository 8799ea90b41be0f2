/// Why a single record could not be resolved.
///
/// The `Display` text is the reason shown to users in error reports.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FailureReason {
    #[error("Route Not Found: route ID '{0}' not found in GIS network")]
    RouteNotFound(String),

    #[error("Invalid Begin Measure: '{0}'")]
    InvalidBeginMeasure(String),

    #[error("Invalid End Measure: '{0}'")]
    InvalidEndMeasure(String),

    #[error("Begin MP {begin} is below Reference Minimum ({min})")]
    BeginBelowMinimum { begin: f64, min: f64 },

    #[error("Begin MP {begin} is above Reference Maximum ({max})")]
    BeginAboveMaximum { begin: f64, max: f64 },

    #[error("End MP {end} is above Reference Maximum ({max})")]
    EndAboveMaximum { end: f64, max: f64 },

    #[error("Begin MP == End MP ({0}); use Point mode")]
    BeginEqualsEnd(f64),

    #[error("End < Begin (begin {begin}, end {end})")]
    EndBeforeBegin { begin: f64, end: f64 },

    #[error("Result is empty: no route segment has continuous geometry")]
    EmptyResult,

    #[error("Measure out of range of all found route segments.")]
    MeasureOutOfRange,

    #[error("Could not generate geometry: segment likely falls in a gap or outside GIS limits.")]
    GeometryGap,
}
