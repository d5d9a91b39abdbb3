//! Ground truth oracle for simulation runs.
//!
//! The Oracle judges a [`SafetyReport`] without trusting the engine:
//! - Exhaustive search decides whether ANY safe order exists
//! - Trace checks verify every snapshot against the problem it came from
//! - Scheduling checks verify the index-order, first-eligible tie-break

use crate::problem::Problem;
use banker_core::{validate, ProblemError, ResourceVector, SafetyReport, Step};
use thiserror::Error;

/// Largest process count the exhaustive search will attempt (2^n states).
pub const DEFAULT_EXHAUSTIVE_LIMIT: usize = 20;

/// A property the trace failed to uphold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("verdict safe={safe} but {scheduled} of {processes} processes were scheduled")]
    VerdictMismatch {
        safe: bool,
        scheduled: usize,
        processes: usize,
    },

    #[error("{steps} steps recorded for {scheduled} scheduled processes")]
    StepCount { steps: usize, scheduled: usize },

    #[error("P{process} scheduled more than once")]
    DuplicateProcess { process: usize },

    #[error("step {step}: expected {phase} snapshot for P{process}")]
    BrokenPair {
        step: usize,
        process: usize,
        phase: &'static str,
    },

    #[error("step {step}: P{process} scheduled with need {need} exceeding work {work}")]
    IneligibleScheduled {
        step: usize,
        process: usize,
        need: ResourceVector,
        work: ResourceVector,
    },

    #[error("step {step}: P{process} need row is {found}, expected {expected}")]
    NeedMismatch {
        step: usize,
        process: usize,
        expected: ResourceVector,
        found: ResourceVector,
    },

    #[error("step {step}: P{process} allocation row is {found}, expected {expected}")]
    AllocationMismatch {
        step: usize,
        process: usize,
        expected: ResourceVector,
        found: ResourceVector,
    },

    #[error("step {step}: requested {found:?} differs from satisfied need {expected}")]
    RequestMismatch {
        step: usize,
        expected: ResourceVector,
        found: Option<ResourceVector>,
    },

    #[error("step {step}: {vector} is {found}, expected {expected} after release")]
    ReleaseMismatch {
        step: usize,
        vector: &'static str,
        expected: ResourceVector,
        found: ResourceVector,
    },

    #[error("step {step}: work {work} decreased from {previous}")]
    WorkDecreased {
        step: usize,
        previous: ResourceVector,
        work: ResourceVector,
    },

    #[error("step {step}: work {work} is below available {available}")]
    WorkBelowAvailable {
        step: usize,
        work: ResourceVector,
        available: ResourceVector,
    },

    #[error("position {position}: P{found} scheduled but P{expected} was the first eligible")]
    TieBreak {
        position: usize,
        expected: usize,
        found: usize,
    },

    #[error("stalled although pending P{process} fits final work {work}")]
    PrematureStall { process: usize, work: ResourceVector },

    #[error("verdict safe={reported} but exhaustive search says safe={exhaustive}")]
    ExhaustiveDisagreement { reported: bool, exhaustive: bool },

    #[error("input rejected: {0}")]
    InvalidProblem(ProblemError),
}

/// Independent checker for simulation output.
#[derive(Debug, Clone)]
pub struct Oracle {
    /// Skip exhaustive search above this many processes
    exhaustive_limit: usize,
}

impl Default for Oracle {
    fn default() -> Self {
        Self::new()
    }
}

impl Oracle {
    pub fn new() -> Self {
        Self {
            exhaustive_limit: DEFAULT_EXHAUSTIVE_LIMIT,
        }
    }

    /// Sets the largest process count for exhaustive search.
    pub fn with_exhaustive_limit(mut self, n: usize) -> Self {
        self.exhaustive_limit = n.min(DEFAULT_EXHAUSTIVE_LIMIT);
        self
    }

    /// Decides whether any safe order exists by searching finish-sets.
    ///
    /// Returns `None` when the problem is too large to search or fails
    /// validation.
    pub fn is_safe(&self, problem: &Problem) -> Option<bool> {
        let n = problem.processes();
        if n > self.exhaustive_limit {
            return None;
        }
        validate(&problem.allocation, &problem.max, &problem.available).ok()?;

        let full: usize = (1 << n) - 1;
        let mut visited = vec![false; 1 << n];
        let mut stack = vec![0usize];
        visited[0] = true;

        while let Some(mask) = stack.pop() {
            if mask == full {
                return Some(true);
            }

            // the pool is fully determined by which processes have finished
            let mut work = problem.available.clone();
            for i in (0..n).filter(|i| mask & (1 << i) != 0) {
                work.add_assign(&problem.allocation[i]);
            }

            for i in (0..n).filter(|i| mask & (1 << i) == 0) {
                let next = mask | (1 << i);
                if visited[next] {
                    continue;
                }
                let fits = problem.max[i]
                    .checked_sub(&problem.allocation[i])
                    .is_some_and(|need| need.fits_within(&work));
                if fits {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }

        Some(false)
    }

    /// Checks a report against the problem it was computed from.
    ///
    /// An empty result means every invariant held. A problem that fails
    /// validation yields a single [`InvariantViolation::InvalidProblem`].
    pub fn check(&self, problem: &Problem, report: &SafetyReport) -> Vec<InvariantViolation> {
        if let Err(e) = validate(&problem.allocation, &problem.max, &problem.available) {
            return vec![InvariantViolation::InvalidProblem(e)];
        }

        let mut violations = Vec::new();
        let n = problem.processes();
        let scheduled = report.sequence.len();

        if report.safe != (scheduled == n) || report.processes != n {
            violations.push(InvariantViolation::VerdictMismatch {
                safe: report.safe,
                scheduled,
                processes: n,
            });
        }

        let mut seen = vec![false; n];
        for &p in &report.sequence {
            if p >= n || seen[p] {
                violations.push(InvariantViolation::DuplicateProcess { process: p });
                return violations;
            }
            seen[p] = true;
        }

        if report.steps.len() != 2 * scheduled {
            violations.push(InvariantViolation::StepCount {
                steps: report.steps.len(),
                scheduled,
            });
            return violations;
        }

        self.check_steps(problem, report, &mut violations);
        self.check_stall(problem, report, &mut violations);

        if let Some(exhaustive) = self.is_safe(problem) {
            if exhaustive != report.safe {
                violations.push(InvariantViolation::ExhaustiveDisagreement {
                    reported: report.safe,
                    exhaustive,
                });
            }
        }

        violations
    }

    fn check_steps(
        &self,
        problem: &Problem,
        report: &SafetyReport,
        violations: &mut Vec<InvariantViolation>,
    ) {
        let n = problem.processes();
        let mut finished = vec![false; n];
        let mut last_work = problem.available.clone();
        let mut last_process: Option<usize> = None;

        for (position, (&p, pair)) in report
            .sequence
            .iter()
            .zip(report.steps.chunks(2))
            .enumerate()
        {
            let (before, after) = (&pair[0], &pair[1]);
            let base = 2 * position;

            if before.process != p || before.completed {
                violations.push(InvariantViolation::BrokenPair {
                    step: base,
                    process: p,
                    phase: "before",
                });
                return;
            }
            if after.process != p || !after.completed {
                violations.push(InvariantViolation::BrokenPair {
                    step: base + 1,
                    process: p,
                    phase: "after",
                });
                return;
            }

            self.check_state(problem, &finished, base, before, violations);

            let expected = first_eligible(problem, before, &finished, last_process);
            if expected != Some(p) {
                violations.push(InvariantViolation::TieBreak {
                    position,
                    expected: expected.unwrap_or(p),
                    found: p,
                });
            }

            if !before.need[p].fits_within(&before.work) {
                violations.push(InvariantViolation::IneligibleScheduled {
                    step: base,
                    process: p,
                    need: before.need[p].clone(),
                    work: before.work.clone(),
                });
            }

            if after.requested.as_ref() != Some(&before.need[p]) {
                violations.push(InvariantViolation::RequestMismatch {
                    step: base + 1,
                    expected: before.need[p].clone(),
                    found: after.requested.clone(),
                });
            }

            let released = &before.allocation[p];
            for (vector, was, now) in [
                ("work", &before.work, &after.work),
                ("available", &before.available, &after.available),
            ] {
                let expected = was.plus(released);
                if *now != expected {
                    violations.push(InvariantViolation::ReleaseMismatch {
                        step: base + 1,
                        vector,
                        expected,
                        found: now.clone(),
                    });
                }
            }

            finished[p] = true;
            self.check_state(problem, &finished, base + 1, after, violations);

            for (offset, step) in [before, after].into_iter().enumerate() {
                let index = base + offset;
                if !last_work.fits_within(&step.work) {
                    violations.push(InvariantViolation::WorkDecreased {
                        step: index,
                        previous: last_work.clone(),
                        work: step.work.clone(),
                    });
                }
                if !step.available.fits_within(&step.work) {
                    violations.push(InvariantViolation::WorkBelowAvailable {
                        step: index,
                        work: step.work.clone(),
                        available: step.available.clone(),
                    });
                }
                last_work = step.work.clone();
            }

            last_process = Some(p);
        }
    }

    /// Every row must be retired if finished and untouched otherwise.
    fn check_state(
        &self,
        problem: &Problem,
        finished: &[bool],
        index: usize,
        step: &Step,
        violations: &mut Vec<InvariantViolation>,
    ) {
        let m = problem.resources();
        for (i, &done) in finished.iter().enumerate() {
            let (expected_alloc, expected_need) = if done {
                (ResourceVector::zeros(m), ResourceVector::zeros(m))
            } else {
                let held = problem.allocation[i].clone();
                let need = problem.max[i]
                    .checked_sub(&held)
                    .unwrap_or_else(|| ResourceVector::zeros(m));
                (held, need)
            };

            match step.allocation.row(i) {
                Some(found) if *found == expected_alloc => {}
                found => violations.push(InvariantViolation::AllocationMismatch {
                    step: index,
                    process: i,
                    expected: expected_alloc,
                    found: found.cloned().unwrap_or_default(),
                }),
            }
            match step.need.row(i) {
                Some(found) if *found == expected_need => {}
                found => violations.push(InvariantViolation::NeedMismatch {
                    step: index,
                    process: i,
                    expected: expected_need,
                    found: found.cloned().unwrap_or_default(),
                }),
            }
        }
    }

    /// An unsafe verdict is only valid if nothing pending fits the final pool.
    fn check_stall(
        &self,
        problem: &Problem,
        report: &SafetyReport,
        violations: &mut Vec<InvariantViolation>,
    ) {
        if report.safe {
            return;
        }
        let work = report
            .steps
            .last()
            .map(|s| s.work.clone())
            .unwrap_or_else(|| problem.available.clone());

        for process in report.pending() {
            let fits = problem.max[process]
                .checked_sub(&problem.allocation[process])
                .is_some_and(|need| need.fits_within(&work));
            if fits {
                violations.push(InvariantViolation::PrematureStall {
                    process,
                    work: work.clone(),
                });
            }
        }
    }
}

/// First unfinished, eligible process scanning cyclically after `last`.
///
/// Work does not change between a completion and the next scan, so
/// continuing the current pass and wrapping into the next one visits
/// processes in the same order the simulator does.
fn first_eligible(
    problem: &Problem,
    before: &Step,
    finished: &[bool],
    last: Option<usize>,
) -> Option<usize> {
    let n = problem.processes();
    let start = last.map_or(0, |p| p + 1);
    (0..n)
        .map(|k| (start + k) % n)
        .find(|&i| !finished[i] && before.need[i].fits_within(&before.work))
}
