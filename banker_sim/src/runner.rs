//! Scenario runner - executes simulations and judges them with the oracle.

use crate::generator::ProblemGenerator;
use crate::oracle::Oracle;
use crate::problem::Problem;
use crate::report::labelled;
use crate::scenarios::{Expectation, ScenarioId};

use banker_core::{SafetyReport, Units};
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario name, or `random` for generated problems
    pub label: String,

    /// Seed used (generated problems only)
    pub seed: Option<u64>,

    /// Whether the run passed the oracle and the expectation
    pub passed: bool,

    /// Safety verdict reported by the simulator
    pub safe: bool,

    /// Sequence reported by the simulator
    pub sequence: Vec<usize>,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,

    /// The full report, for tracing and export
    pub report: Option<SafetyReport>,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default)]
pub struct ScenarioMetrics {
    /// Processes in the problem
    pub processes: usize,

    /// Resource types in the problem
    pub resources: usize,

    /// Snapshots recorded
    pub steps: usize,

    /// Outer scheduling passes
    pub passes: usize,

    /// Instances returned to the pool by finishing processes
    pub released_units: u64,

    /// Invariant violations reported by the oracle
    pub violations: usize,
}

/// Runs scenarios and generated problems.
pub struct ScenarioRunner {
    /// Processes per generated problem
    processes: usize,

    /// Resource types per generated problem
    resources: usize,

    /// Upper bound for generated max-demand entries
    max_demand: Units,

    /// Oracle used to judge every run
    oracle: Oracle,
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioRunner {
    /// Creates a runner with textbook-sized random problems.
    pub fn new() -> Self {
        Self {
            processes: 5,
            resources: 3,
            max_demand: 9,
            oracle: Oracle::new(),
        }
    }

    /// Sets the number of processes for generated problems.
    pub fn with_processes(mut self, n: usize) -> Self {
        self.processes = n;
        self
    }

    /// Sets the number of resource types for generated problems.
    pub fn with_resources(mut self, m: usize) -> Self {
        self.resources = m;
        self
    }

    /// Sets the max-demand bound for generated problems.
    pub fn with_max_demand(mut self, k: Units) -> Self {
        self.max_demand = k;
        self
    }

    /// Runs a built-in scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} ({})", scenario.name(), scenario.description());

        let problem = scenario.problem();
        self.judge(scenario.name(), None, &problem, Some(scenario.expectation()))
    }

    /// Generates a problem from `seed`, runs it, and returns the result.
    ///
    /// The expected verdict comes from the oracle's exhaustive search.
    pub fn run_random(&self, seed: u64) -> ScenarioResult {
        let problem = ProblemGenerator::new(seed)
            .with_processes(self.processes)
            .with_resources(self.resources)
            .with_max_demand(self.max_demand)
            .generate();

        info!(
            "Starting random problem (seed={}, {} processes x {} resources)",
            seed,
            problem.processes(),
            problem.resources()
        );

        self.judge("random", Some(seed), &problem, None)
    }

    /// Runs an arbitrary problem with no fixed expectation.
    pub fn run_problem(&self, label: &str, problem: &Problem) -> ScenarioResult {
        info!("Starting problem: {}", label);
        self.judge(label, None, problem, None)
    }

    fn judge(
        &self,
        label: &str,
        seed: Option<u64>,
        problem: &Problem,
        expectation: Option<Expectation>,
    ) -> ScenarioResult {
        let mut metrics = ScenarioMetrics {
            processes: problem.processes(),
            resources: problem.resources(),
            ..Default::default()
        };

        let report = match problem.solve() {
            Ok(report) => report,
            Err(e) => {
                warn!("{} rejected: {}", label, e);
                return ScenarioResult {
                    label: label.to_string(),
                    seed,
                    passed: false,
                    safe: false,
                    sequence: Vec::new(),
                    failure_reason: Some(e.to_string()),
                    metrics,
                    report: None,
                };
            }
        };

        for (index, step) in report.steps.iter().enumerate() {
            debug!(
                "  step {:>3} | P{} {} | work: {} | available: {}",
                index + 1,
                step.process,
                if step.completed { "released" } else { "eligible" },
                labelled(&step.work),
                labelled(&step.available)
            );
        }

        metrics.steps = report.steps.len();
        metrics.passes = report.passes;
        metrics.released_units = report
            .steps
            .chunks(2)
            .filter_map(|pair| match pair {
                [before, after] => Some(after.work.sum() - before.work.sum()),
                _ => None,
            })
            .sum();

        if report.safe {
            info!("  {} | {}", report.verdict(), report.sequence_label());
        } else {
            warn!(
                "  {} | scheduled {:?}, stalled {:?}",
                report.verdict(),
                report.sequence,
                report.pending()
            );
        }

        let violations = self.oracle.check(problem, &report);
        metrics.violations = violations.len();
        for violation in &violations {
            warn!("  invariant violated: {}", violation);
        }

        let failure_reason = if let Some(first) = violations.first() {
            Some(format!("{} ({} violation(s))", first, violations.len()))
        } else {
            expectation.and_then(|expected| expectation_failure(&expected, &report))
        };

        ScenarioResult {
            label: label.to_string(),
            seed,
            passed: failure_reason.is_none(),
            safe: report.safe,
            sequence: report.sequence.clone(),
            failure_reason,
            metrics,
            report: Some(report),
        }
    }
}

fn expectation_failure(expected: &Expectation, report: &SafetyReport) -> Option<String> {
    if expected.safe != report.safe {
        return Some(format!(
            "expected safe={} but simulator reported safe={}",
            expected.safe, report.safe
        ));
    }
    match &expected.sequence {
        Some(sequence) if *sequence != report.sequence => Some(format!(
            "expected sequence {:?} but got {:?}",
            sequence, report.sequence
        )),
        _ => None,
    }
}
