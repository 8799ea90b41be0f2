//! Batch resolution and the accumulated results across re-runs.
//!
//! A run resolves every record independently; one failure never stops the
//! batch. [`BatchResults`] is owned by the caller and merges successive runs
//! (initial run, then re-runs of edited failures).

use rayon::prelude::*;
use tracing::info;

use crate::lrs::MeasureResolver;
use crate::models::{InputRecord, OutputKind, ResolutionFailure, ResolvedFeature};

/// Outcome of resolving one record
pub type Outcome = Result<ResolvedFeature, ResolutionFailure>;

/// Results of a single pass over a set of records
#[derive(Debug, Clone, Default)]
pub struct BatchRun {
    pub points: Vec<ResolvedFeature>,
    pub lines: Vec<ResolvedFeature>,
    pub failures: Vec<ResolutionFailure>,
}

impl BatchRun {
    /// Split outcomes into points, lines and failures, keeping input order
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = Outcome>,
    {
        let mut run = BatchRun::default();
        for outcome in outcomes {
            match outcome {
                Ok(feature) => match feature.geometry.kind() {
                    OutputKind::Point => run.points.push(feature),
                    OutputKind::Line => run.lines.push(feature),
                },
                Err(failure) => run.failures.push(failure),
            }
        }
        run
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            points: self.points.len(),
            lines: self.lines.len(),
            failures: self.failures.len(),
        }
    }
}

/// Resolve records one after another
pub fn resolve_batch(resolver: &MeasureResolver<'_>, records: &[InputRecord]) -> BatchRun {
    let run = BatchRun::from_outcomes(records.iter().map(|r| resolver.resolve(r)));
    info!("Resolved {} rows: {}", records.len(), run.summary());
    run
}

/// Resolve records on the rayon pool. Output order matches input order.
pub fn resolve_batch_parallel(
    resolver: &MeasureResolver<'_>,
    records: &[InputRecord],
) -> BatchRun {
    let outcomes: Vec<Outcome> = records.par_iter().map(|r| resolver.resolve(r)).collect();
    let run = BatchRun::from_outcomes(outcomes);
    info!("Resolved {} rows in parallel: {}", records.len(), run.summary());
    run
}

/// Counts per output collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub points: usize,
    pub lines: usize,
    pub failures: usize,
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} points, {} lines, {} errors",
            self.points, self.lines, self.failures
        )
    }
}

/// Results accumulated across runs of a session
#[derive(Debug, Clone, Default)]
pub struct BatchResults {
    pub points: Vec<ResolvedFeature>,
    pub lines: Vec<ResolvedFeature>,
    pub failures: Vec<ResolutionFailure>,
    runs: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a run: successes are appended, failures replace the previous set
    pub fn absorb(&mut self, run: BatchRun) {
        self.points.extend(run.points);
        self.lines.extend(run.lines);
        self.failures = run.failures;
        self.runs += 1;
    }

    /// Records of the current failures, for editing and resubmitting
    pub fn failed_records(&self) -> Vec<InputRecord> {
        self.failures.iter().map(|f| f.record.clone()).collect()
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            points: self.points.len(),
            lines: self.lines.len(),
            failures: self.failures.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lrs::{FailureReason, ResolverConfig};
    use crate::network::{RouteFeature, RouteIndex};
    use geo::line_string;

    fn index() -> RouteIndex {
        RouteIndex::build(vec![RouteFeature::from_line(
            "R1",
            line_string![(x: 0.0, y: 0.0), (x: 1000.0, y: 0.0)],
        )])
    }

    fn records() -> Vec<InputRecord> {
        vec![
            InputRecord::new("R1", "10"),
            InputRecord::new("R1", "10").with_end("20"),
            InputRecord::new("R2", "10"),
            InputRecord::new("R1", "x"),
        ]
    }

    #[test]
    fn test_one_failure_does_not_stop_the_batch() {
        let index = index();
        let resolver = MeasureResolver::new(&index, ResolverConfig::default().with_unit_factor(1.0));
        let run = resolve_batch(&resolver, &records());

        assert_eq!(
            run.summary(),
            BatchSummary {
                points: 1,
                lines: 1,
                failures: 2
            }
        );
        assert_eq!(
            run.failures[0].reason,
            FailureReason::RouteNotFound("R2".into())
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let index = index();
        let resolver = MeasureResolver::new(&index, ResolverConfig::default().with_unit_factor(1.0));
        let sequential = resolve_batch(&resolver, &records());
        let parallel = resolve_batch_parallel(&resolver, &records());

        assert_eq!(sequential.points, parallel.points);
        assert_eq!(sequential.lines, parallel.lines);
        assert_eq!(sequential.failures, parallel.failures);
    }

    #[test]
    fn test_rerun_appends_successes_and_replaces_failures() {
        let index = index();
        let resolver = MeasureResolver::new(&index, ResolverConfig::default().with_unit_factor(1.0));
        let mut results = BatchResults::new();
        results.absorb(resolve_batch(&resolver, &records()));
        assert_eq!(results.failures.len(), 2);

        // Fix the bad measure, leave the unknown route as is
        let mut retry = results.failed_records();
        retry[1].begin_measure = Some("30".into());
        results.absorb(resolve_batch(&resolver, &retry));

        assert_eq!(results.runs(), 2);
        assert_eq!(results.points.len(), 2);
        assert_eq!(results.lines.len(), 1);
        assert_eq!(results.failures.len(), 1);
        assert_eq!(results.failures[0].record.route_id, "R2");
    }
}
