//! Normalization of engine reports into [`NormalizedResult`].
use std::path::Path;

use shard_core::{Normalizer, RunConfig};
use shard_model::{
    NormalizedResult, RunStatus, SpecId, SpecResult, SpecStats, TestResult, TestState,
};
use tracing::debug;

use crate::raw::{EngineReport, EngineRun, EngineTest, RawResult};

/// Maps [`RawResult`] onto the canonical per-spec structure.
///
/// Reports are matched against the requested specs: runs for specs that were
/// not requested are dropped. A failed engine run yields one errored entry per
/// requested spec so every claimed spec still gets a summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineNormalizer;

impl Normalizer<RawResult> for EngineNormalizer {
    fn normalize(&self, raw: RawResult, requested: &[SpecId], config: &RunConfig) -> NormalizedResult {
        match raw {
            RawResult::Completed(report) => from_report(report, requested, config.spec_root.as_deref()),
            RawResult::Failed { message } => failed(message, requested),
        }
    }
}

fn from_report(report: EngineReport, requested: &[SpecId], root: Option<&Path>) -> NormalizedResult {
    let runs = report
        .runs
        .into_iter()
        .filter_map(|run| {
            let spec = spec_id(&run, root);
            if requested.iter().any(|r| *r == spec) {
                Some(spec_result(spec, run))
            } else {
                debug!(target: "shard.exec.results", %spec, "dropping run for a spec that was not requested");
                None
            }
        })
        .collect();

    NormalizedResult {
        status: RunStatus::Finished,
        total_duration_ms: report.total_duration,
        runs,
        error: None,
    }
}

fn failed(message: String, requested: &[SpecId]) -> NormalizedResult {
    let runs = requested
        .iter()
        .map(|spec| SpecResult {
            spec: spec.clone(),
            stats: SpecStats {
                failures: 1,
                ..Default::default()
            },
            tests: Vec::new(),
            error: Some(message.clone()),
        })
        .collect();

    NormalizedResult {
        status: RunStatus::Failed,
        total_duration_ms: 0,
        runs,
        error: Some(message),
    }
}

/// Spec identifier for `run`: forward slashes, relative to `root` when the engine reported an absolute path.
fn spec_id(run: &EngineRun, root: Option<&Path>) -> SpecId {
    let relative = Path::new(&run.spec.relative);
    let path = match root {
        Some(root) if relative.is_absolute() => relative.strip_prefix(root).unwrap_or(relative),
        _ => relative,
    };
    path.to_string_lossy().replace('\\', "/")
}

fn spec_result(spec: SpecId, run: EngineRun) -> SpecResult {
    SpecResult {
        spec,
        stats: SpecStats {
            tests: run.stats.tests,
            passes: run.stats.passes,
            failures: run.stats.failures,
            pending: run.stats.pending,
            skipped: run.stats.skipped,
            duration_ms: run.stats.duration,
        },
        tests: run.tests.into_iter().map(test_result).collect(),
        error: run.error,
    }
}

fn test_result(test: EngineTest) -> TestResult {
    TestResult {
        title: test.title,
        state: test_state(&test.state),
        duration_ms: test.duration,
        error: test.display_error,
    }
}

fn test_state(state: &str) -> TestState {
    match state.to_ascii_lowercase().as_str() {
        "passed" => TestState::Passed,
        "failed" => TestState::Failed,
        "pending" => TestState::Pending,
        _ => TestState::Skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{EngineSpec, EngineStats};

    fn run(relative: &str, failures: u32) -> EngineRun {
        EngineRun {
            spec: EngineSpec {
                relative: relative.into(),
                absolute: None,
            },
            stats: EngineStats {
                tests: 2,
                passes: 2 - failures,
                failures,
                duration: 40,
                ..Default::default()
            },
            tests: vec![EngineTest {
                title: vec!["login".into(), "works".into()],
                state: "failed".into(),
                duration: 20,
                display_error: Some("expected true".into()),
            }],
            error: None,
        }
    }

    fn requested(specs: &[&str]) -> Vec<SpecId> {
        specs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn completed_report_maps_requested_specs() {
        let report = EngineReport {
            total_duration: 80,
            runs: vec![run("a.spec", 0), run("b.spec", 1), run("other.spec", 0)],
        };
        let result = EngineNormalizer.normalize(
            RawResult::Completed(report),
            &requested(&["a.spec", "b.spec"]),
            &RunConfig::default(),
        );

        assert_eq!(result.status, RunStatus::Finished);
        assert_eq!(result.total_duration_ms, 80);
        assert_eq!(result.runs.len(), 2);
        assert!(result.spec("other.spec").is_none());

        let b = result.spec("b.spec").unwrap();
        assert_eq!(b.stats.failures, 1);
        assert_eq!(b.stats.duration_ms, 40);
        assert_eq!(b.tests[0].state, TestState::Failed);
        assert_eq!(b.tests[0].error.as_deref(), Some("expected true"));
    }

    #[test]
    fn missing_run_is_left_out() {
        let report = EngineReport {
            total_duration: 10,
            runs: vec![run("a.spec", 0)],
        };
        let result = EngineNormalizer.normalize(
            RawResult::Completed(report),
            &requested(&["a.spec", "gone.spec"]),
            &RunConfig::default(),
        );
        assert!(result.summary_for("gone.spec").is_none());
        assert!(result.summary_for("a.spec").unwrap().passed());
    }

    #[cfg(unix)]
    #[test]
    fn absolute_paths_are_made_relative_to_root() {
        let report = EngineReport {
            total_duration: 0,
            runs: vec![run("/work/project/cypress/e2e/a.cy.ts", 0)],
        };
        let config = RunConfig::default().with_spec_root("/work/project");
        let result = EngineNormalizer.normalize(
            RawResult::Completed(report),
            &requested(&["cypress/e2e/a.cy.ts"]),
            &config,
        );
        assert!(result.spec("cypress/e2e/a.cy.ts").is_some());
    }

    #[test]
    fn failed_run_reports_every_requested_spec() {
        let result = EngineNormalizer.normalize(
            RawResult::failed("spawn failed: engine"),
            &requested(&["a.spec", "b.spec"]),
            &RunConfig::default(),
        );

        assert_eq!(result.status, RunStatus::Failed);
        assert_eq!(result.error.as_deref(), Some("spawn failed: engine"));
        for spec in ["a.spec", "b.spec"] {
            let summary = result.summary_for(spec).unwrap();
            assert_eq!(summary.stats.failures, 1);
            assert_eq!(summary.error.as_deref(), Some("spawn failed: engine"));
            assert!(!summary.passed());
        }
    }

    #[test]
    fn unknown_test_state_is_skipped() {
        assert_eq!(test_state("PASSED"), TestState::Passed);
        assert_eq!(test_state("weird"), TestState::Skipped);
    }
}
