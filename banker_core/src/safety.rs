//! Banker's Algorithm safety simulation.
//!
//! [`simulate`] runs the textbook safety check on private copies of the
//! input and records a before/after [`Step`] pair for every process it
//! schedules. Processes are scanned in index order on every pass; the first
//! eligible process runs immediately, so the resulting sequence is
//! deterministic for a given input.
//!
//! ```
//! use banker_core::{simulate, Matrix, ResourceVector};
//!
//! let allocation = Matrix::from(vec![vec![0, 1, 0], vec![2, 0, 0]]);
//! let max = Matrix::from(vec![vec![1, 1, 0], vec![3, 2, 2]]);
//! let available = ResourceVector::from(vec![1, 2, 2]);
//!
//! let report = simulate(&allocation, &max, &available).unwrap();
//! assert!(report.safe);
//! assert_eq!(report.sequence, vec![0, 1]);
//! assert_eq!(report.steps.len(), 4);
//! ```

use crate::resources::{Matrix, ResourceVector};
use crate::validation::{validate, ProblemError};
use serde::{Deserialize, Serialize};

/// Immutable record of the simulation state around one process's turn.
///
/// A "before" step (`completed == false`) shows the state the process was
/// found eligible in. The matching "after" step shows the state once it has
/// released its allocation and its need row has been retired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Process handled at this step
    pub process: usize,

    /// Allocation matrix at this instant
    pub allocation: Matrix,

    /// Need matrix at this instant (zero rows for finished processes)
    pub need: Matrix,

    /// Need row satisfied at this turn, captured before the need recompute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested: Option<ResourceVector>,

    /// Resources not held by any process
    pub available: ResourceVector,

    /// Simulated resource pool
    pub work: ResourceVector,

    /// False for the pre-execution view, true for the post-execution view
    pub completed: bool,
}

impl Step {
    /// Allocation plus need for the handled process.
    ///
    /// Zero on completion steps, since both rows have been retired.
    pub fn max_required(&self) -> ResourceVector {
        match (self.allocation.row(self.process), self.need.row(self.process)) {
            (Some(held), Some(need)) => held.plus(need),
            _ => ResourceVector::zeros(self.available.len()),
        }
    }

    /// Number of processes in the snapshot.
    pub fn processes(&self) -> usize {
        self.allocation.rows()
    }
}

/// Outcome of one safety simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyReport {
    /// True when every process could be scheduled
    pub safe: bool,

    /// Process indices in the order they were declared eligible
    pub sequence: Vec<usize>,

    /// Before/after snapshot pairs, one pair per scheduled process
    pub steps: Vec<Step>,

    /// Number of processes in the input
    pub processes: usize,

    /// Outer passes performed, including the final pass that made no progress
    pub passes: usize,
}

impl SafetyReport {
    /// Processes that never became eligible, ascending.
    pub fn pending(&self) -> Vec<usize> {
        (0..self.processes)
            .filter(|i| !self.sequence.contains(i))
            .collect()
    }

    /// Human-readable verdict.
    pub fn verdict(&self) -> &'static str {
        if self.safe {
            "Safe State"
        } else {
            "Unsafe State"
        }
    }

    /// `P1 → P3 → P4` for a safe state, a fixed message otherwise.
    pub fn sequence_label(&self) -> String {
        if !self.safe {
            return "No Safe Sequence Found".to_string();
        }
        self.sequence
            .iter()
            .map(|i| format!("P{}", i))
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

/// Runs the safety check on `(allocation, max, available)`.
///
/// The inputs are only borrowed; all mutation happens on owned copies.
/// `Ok` with `safe == false` is the normal unsafe outcome, and its
/// `sequence`/`steps` keep the partial progress made before the stall.
pub fn simulate(
    allocation: &Matrix,
    max: &Matrix,
    available: &ResourceVector,
) -> Result<SafetyReport, ProblemError> {
    validate(allocation, max, available)?;

    let n = allocation.rows();
    let m = available.len();

    let mut allocation = allocation.clone();
    let mut available = available.clone();
    let mut work = available.clone();
    let mut finish = vec![false; n];
    let mut need = Matrix::zeros(n, m);
    recompute_need(&mut need, max, &allocation, &finish);

    let mut sequence = Vec::with_capacity(n);
    let mut steps = Vec::with_capacity(2 * n);
    let mut passes = 0;
    let mut made_progress = true;

    while sequence.len() < n && made_progress {
        made_progress = false;
        passes += 1;

        for i in 0..n {
            if finish[i] || !need[i].fits_within(&work) {
                continue;
            }

            steps.push(Step {
                process: i,
                allocation: allocation.clone(),
                need: need.clone(),
                requested: None,
                available: available.clone(),
                work: work.clone(),
                completed: false,
            });

            // Process runs to completion and returns everything it holds
            work.add_assign(&allocation[i]);
            finish[i] = true;
            sequence.push(i);
            made_progress = true;

            available.add_assign(&allocation[i]);
            allocation[i].clear();

            let requested = need[i].clone();
            recompute_need(&mut need, max, &allocation, &finish);

            steps.push(Step {
                process: i,
                allocation: allocation.clone(),
                need: need.clone(),
                requested: Some(requested),
                available: available.clone(),
                work: work.clone(),
                completed: true,
            });
        }
    }

    Ok(SafetyReport {
        safe: sequence.len() == n,
        sequence,
        steps,
        processes: n,
        passes,
    })
}

/// `need = max - allocation` for unfinished rows, zero for finished ones.
fn recompute_need(need: &mut Matrix, max: &Matrix, allocation: &Matrix, finish: &[bool]) {
    for (i, &done) in finish.iter().enumerate() {
        let row = &mut need[i];
        for j in 0..row.len() {
            row[j] = if done {
                0
            } else {
                max[i][j].saturating_sub(allocation[i][j])
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textbook() -> (Matrix, Matrix, ResourceVector) {
        (
            Matrix::from(vec![
                vec![0, 1, 0],
                vec![2, 0, 0],
                vec![3, 0, 2],
                vec![2, 1, 1],
                vec![0, 0, 2],
            ]),
            Matrix::from(vec![
                vec![7, 5, 3],
                vec![3, 2, 2],
                vec![9, 0, 2],
                vec![2, 2, 2],
                vec![4, 3, 3],
            ]),
            ResourceVector::from(vec![3, 3, 2]),
        )
    }

    #[test]
    fn test_textbook_example_is_safe() {
        let (allocation, max, available) = textbook();

        let report = simulate(&allocation, &max, &available).unwrap();

        assert!(report.safe);
        assert_eq!(report.sequence, vec![1, 3, 4, 0, 2]);
        assert_eq!(report.steps.len(), 10);
        assert_eq!(report.passes, 2);
        assert_eq!(report.sequence_label(), "P1 → P3 → P4 → P0 → P2");
    }

    #[test]
    fn test_textbook_first_pair_of_steps() {
        let (allocation, max, available) = textbook();

        let report = simulate(&allocation, &max, &available).unwrap();
        let before = &report.steps[0];
        let after = &report.steps[1];

        assert_eq!(before.process, 1);
        assert!(!before.completed);
        assert_eq!(before.requested, None);
        assert_eq!(before.work, ResourceVector::from(vec![3, 3, 2]));
        assert_eq!(before.need[1], ResourceVector::from(vec![1, 2, 2]));
        assert_eq!(before.max_required(), ResourceVector::from(vec![3, 2, 2]));

        assert_eq!(after.process, 1);
        assert!(after.completed);
        assert_eq!(after.requested, Some(ResourceVector::from(vec![1, 2, 2])));
        assert_eq!(after.work, ResourceVector::from(vec![5, 3, 2]));
        assert_eq!(after.available, ResourceVector::from(vec![5, 3, 2]));
        assert!(after.allocation[1].is_zero());
        assert!(after.need[1].is_zero());
        // untouched rows keep their need
        assert_eq!(after.need[0], ResourceVector::from(vec![7, 4, 3]));
    }

    #[test]
    fn test_no_process_fits() {
        let allocation = Matrix::from(vec![vec![1, 0]]);
        let max = Matrix::from(vec![vec![5, 1]]);
        let available = ResourceVector::from(vec![2, 1]);

        let report = simulate(&allocation, &max, &available).unwrap();

        assert!(!report.safe);
        assert!(report.sequence.is_empty());
        assert!(report.steps.is_empty());
        assert_eq!(report.pending(), vec![0]);
        assert_eq!(report.sequence_label(), "No Safe Sequence Found");
        assert_eq!(report.verdict(), "Unsafe State");
    }

    #[test]
    fn test_single_process_with_zero_need() {
        let allocation = Matrix::from(vec![vec![2, 1]]);
        let max = allocation.clone();
        let available = ResourceVector::from(vec![0, 0]);

        let report = simulate(&allocation, &max, &available).unwrap();

        assert!(report.safe);
        assert_eq!(report.sequence, vec![0]);
        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.steps[1].work, ResourceVector::from(vec![2, 1]));
    }

    #[test]
    fn test_all_eligible_runs_in_index_order() {
        let allocation = Matrix::from(vec![vec![1, 0], vec![0, 1], vec![1, 1], vec![0, 0]]);
        let max = Matrix::from(vec![vec![2, 0], vec![0, 2], vec![1, 2], vec![1, 1]]);
        let available = ResourceVector::from(vec![1, 1]);

        let report = simulate(&allocation, &max, &available).unwrap();

        assert!(report.safe);
        assert_eq!(report.sequence, vec![0, 1, 2, 3]);
        assert_eq!(report.passes, 1);
    }

    #[test]
    fn test_partial_progress_is_kept_when_unsafe() {
        // P0 finishes, P1 and P2 each need more than the pool ever holds
        let allocation = Matrix::from(vec![vec![1, 0], vec![1, 1], vec![0, 1]]);
        let max = Matrix::from(vec![vec![1, 1], vec![4, 3], vec![5, 1]]);
        let available = ResourceVector::from(vec![0, 1]);

        let report = simulate(&allocation, &max, &available).unwrap();

        assert!(!report.safe);
        assert_eq!(report.sequence, vec![0]);
        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.pending(), vec![1, 2]);
        assert_eq!(report.passes, 2);
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let (allocation, max, available) = textbook();
        let (a0, m0, v0) = (allocation.clone(), max.clone(), available.clone());

        let _ = simulate(&allocation, &max, &available).unwrap();

        assert_eq!(allocation, a0);
        assert_eq!(max, m0);
        assert_eq!(available, v0);
    }

    #[test]
    fn test_simulation_is_deterministic() {
        let (allocation, max, available) = textbook();

        let first = simulate(&allocation, &max, &available).unwrap();
        let second = simulate(&allocation, &max, &available).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_problem_is_safe() {
        let report =
            simulate(&Matrix::default(), &Matrix::default(), &ResourceVector::default()).unwrap();

        assert!(report.safe);
        assert!(report.sequence.is_empty());
        assert!(report.steps.is_empty());
        assert_eq!(report.sequence_label(), "");
    }

    #[test]
    fn test_invalid_input_fails_fast() {
        let allocation = Matrix::from(vec![vec![2, 0]]);
        let max = Matrix::from(vec![vec![1, 0]]);

        let err = simulate(&allocation, &max, &ResourceVector::from(vec![1, 1])).unwrap_err();

        assert!(matches!(err, ProblemError::DemandBelowAllocation { process: 0, .. }));
    }

    #[test]
    fn test_step_serialization_skips_missing_request() {
        let allocation = Matrix::from(vec![vec![1]]);
        let report = simulate(&allocation, &allocation, &ResourceVector::from(vec![0])).unwrap();

        let before = serde_json::to_value(&report.steps[0]).unwrap();
        let after = serde_json::to_value(&report.steps[1]).unwrap();

        assert!(before.get("requested").is_none());
        assert_eq!(after["requested"], serde_json::json!([0]));
        assert_eq!(after["allocation"], serde_json::json!([[0]]));
    }
}
