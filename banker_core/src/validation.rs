//! Validation Module - Input Preconditions for the Safety Simulator
//! ================================================================
//!
//! The simulator fails fast on malformed input instead of producing a
//! meaningless trace. Checks, in order:
//! - at least one resource type when any process exists
//! - same number of rows in `allocation` and `max`
//! - every row as wide as `available`
//! - `max >= allocation` everywhere
//! - `available[j] + sum(allocation[*][j])` fits in [`Units`]
//!
//! Negative counts cannot be expressed because [`Units`] is unsigned.

use crate::resources::{Matrix, ResourceVector, Units};
use thiserror::Error;

/// Which input matrix a [`ProblemError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixKind {
    Allocation,
    Max,
}

impl std::fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixKind::Allocation => write!(f, "allocation"),
            MatrixKind::Max => write!(f, "max"),
        }
    }
}

/// Malformed simulator input. An unsafe state is NOT an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProblemError {
    /// `available` is empty while processes exist
    #[error("no resource types: available vector is empty for {processes} process(es)")]
    NoResources { processes: usize },

    /// `allocation` and `max` disagree on the number of processes
    #[error("process count mismatch: allocation has {allocation} rows, max has {max}")]
    ProcessCountMismatch { allocation: usize, max: usize },

    /// A row is not as wide as the available vector
    #[error("{matrix} row P{process} has {found} columns, expected {expected}")]
    RaggedRow {
        matrix: MatrixKind,
        process: usize,
        expected: usize,
        found: usize,
    },

    /// A process already holds more than its declared maximum
    #[error("P{process} resource {resource}: max {max} is below allocation {allocation}")]
    DemandBelowAllocation {
        process: usize,
        resource: usize,
        max: Units,
        allocation: Units,
    },

    /// Total instances of a resource type exceed the unit range
    #[error("resource {resource}: total instances overflow")]
    Overflow { resource: usize },
}

impl ProblemError {
    /// Creates a ragged-row error.
    pub fn ragged(matrix: MatrixKind, process: usize, expected: usize, found: usize) -> Self {
        Self::RaggedRow {
            matrix,
            process,
            expected,
            found,
        }
    }
}

/// Checks every precondition of [`crate::simulate`].
pub fn validate(
    allocation: &Matrix,
    max: &Matrix,
    available: &ResourceVector,
) -> Result<(), ProblemError> {
    let n = allocation.rows();
    let m = available.len();

    if n != max.rows() {
        return Err(ProblemError::ProcessCountMismatch {
            allocation: n,
            max: max.rows(),
        });
    }

    if n > 0 && m == 0 {
        return Err(ProblemError::NoResources { processes: n });
    }

    for (kind, matrix) in [(MatrixKind::Allocation, allocation), (MatrixKind::Max, max)] {
        if let Some((i, row)) = matrix.iter().enumerate().find(|(_, row)| row.len() != m) {
            return Err(ProblemError::ragged(kind, i, m, row.len()));
        }
    }

    for (i, (held, claim)) in allocation.iter().zip(max.iter()).enumerate() {
        for (j, (&a, &c)) in held.as_slice().iter().zip(claim.as_slice()).enumerate() {
            if c < a {
                return Err(ProblemError::DemandBelowAllocation {
                    process: i,
                    resource: j,
                    max: c,
                    allocation: a,
                });
            }
        }
    }

    // work and available both end at available + column sum
    for (j, &free) in available.as_slice().iter().enumerate() {
        let total = u64::from(free) + allocation.column_sum(j);
        if total > u64::from(Units::MAX) {
            return Err(ProblemError::Overflow { resource: j });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(units: &[Units]) -> ResourceVector {
        ResourceVector::from(units.to_vec())
    }

    #[test]
    fn test_accepts_textbook_input() {
        let allocation = Matrix::from(vec![vec![0, 1, 0], vec![2, 0, 0]]);
        let max = Matrix::from(vec![vec![7, 5, 3], vec![3, 2, 2]]);

        assert_eq!(validate(&allocation, &max, &vector(&[3, 3, 2])), Ok(()));
    }

    #[test]
    fn test_empty_problem_is_valid() {
        assert_eq!(validate(&Matrix::default(), &Matrix::default(), &vector(&[])), Ok(()));
    }

    #[test]
    fn test_rejects_process_count_mismatch() {
        let allocation = Matrix::from(vec![vec![0, 1]]);
        let max = Matrix::from(vec![vec![1, 1], vec![1, 1]]);

        assert_eq!(
            validate(&allocation, &max, &vector(&[1, 1])),
            Err(ProblemError::ProcessCountMismatch { allocation: 1, max: 2 })
        );
    }

    #[test]
    fn test_rejects_missing_resources() {
        let rows = Matrix::from(vec![vec![]]);

        assert_eq!(
            validate(&rows, &rows, &vector(&[])),
            Err(ProblemError::NoResources { processes: 1 })
        );
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let allocation = Matrix::from(vec![vec![0, 1], vec![1]]);
        let max = Matrix::from(vec![vec![1, 1], vec![1, 1]]);

        let err = validate(&allocation, &max, &vector(&[1, 1])).unwrap_err();
        assert_eq!(err, ProblemError::ragged(MatrixKind::Allocation, 1, 2, 1));
        assert_eq!(err.to_string(), "allocation row P1 has 1 columns, expected 2");
    }

    #[test]
    fn test_rejects_demand_below_allocation() {
        let allocation = Matrix::from(vec![vec![3, 0]]);
        let max = Matrix::from(vec![vec![2, 0]]);

        assert_eq!(
            validate(&allocation, &max, &vector(&[0, 0])),
            Err(ProblemError::DemandBelowAllocation {
                process: 0,
                resource: 0,
                max: 2,
                allocation: 3,
            })
        );
    }

    #[test]
    fn test_rejects_overflowing_totals() {
        let allocation = Matrix::from(vec![vec![0, Units::MAX]]);
        let max = Matrix::from(vec![vec![0, Units::MAX]]);

        assert_eq!(
            validate(&allocation, &max, &vector(&[0, 1])),
            Err(ProblemError::Overflow { resource: 1 })
        );
    }
}
