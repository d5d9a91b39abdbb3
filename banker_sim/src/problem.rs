//! Problem definitions: the three inputs of one safety simulation.
//!
//! Problem files are JSON objects:
//!
//! ```json
//! {
//!   "allocation": [[0, 1, 0], [2, 0, 0]],
//!   "max":        [[7, 5, 3], [3, 2, 2]],
//!   "available":  [3, 3, 2]
//! }
//! ```

use crate::error::SimError;
use banker_core::{simulate, validate, Matrix, ProblemError, ResourceVector, SafetyReport};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Allocation, maximum demand and available resources for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Resources currently held, one row per process
    pub allocation: Matrix,

    /// Maximum resources each process may ever request
    pub max: Matrix,

    /// Resources not held by any process
    pub available: ResourceVector,
}

impl Problem {
    pub fn new(allocation: Matrix, max: Matrix, available: ResourceVector) -> Self {
        Self {
            allocation,
            max,
            available,
        }
    }

    /// The classic five-process, three-resource example.
    pub fn textbook() -> Self {
        Self::new(
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

    /// Parses a problem from JSON text and checks its preconditions.
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let problem: Problem = serde_json::from_str(json)?;
        validate(&problem.allocation, &problem.max, &problem.available)?;
        Ok(problem)
    }

    /// Reads a problem from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| SimError::io(path.display(), e))?;
        Self::from_json_str(&json)
    }

    /// Runs the safety simulation on this problem.
    pub fn solve(&self) -> Result<SafetyReport, ProblemError> {
        simulate(&self.allocation, &self.max, &self.available)
    }

    pub fn processes(&self) -> usize {
        self.allocation.rows()
    }

    pub fn resources(&self) -> usize {
        self.available.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_textbook_solves() {
        let problem = Problem::textbook();

        let report = problem.solve().unwrap();

        assert_eq!(problem.processes(), 5);
        assert_eq!(problem.resources(), 3);
        assert_eq!(report.sequence, vec![1, 3, 4, 0, 2]);
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "allocation": [[1, 0]],
            "max": [[1, 2]],
            "available": [0, 2]
        }"#;

        let problem = Problem::from_json_str(json).unwrap();

        assert_eq!(problem.available, ResourceVector::from(vec![0, 2]));
        assert!(problem.solve().unwrap().safe);
    }

    #[test]
    fn test_negative_entries_fail_to_parse() {
        let json = r#"{"allocation": [[-1]], "max": [[1]], "available": [1]}"#;

        assert!(matches!(Problem::from_json_str(json), Err(SimError::Json(_))));
    }

    #[test]
    fn test_malformed_problem_is_rejected_on_parse() {
        let json = r#"{"allocation": [[1, 0], [0]], "max": [[1, 1], [1, 1]], "available": [0, 0]}"#;

        let err = Problem::from_json_str(json).unwrap_err();

        assert!(matches!(err, SimError::Problem(ProblemError::RaggedRow { process: 1, .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("textbook.json");
        fs::write(&path, serde_json::to_string(&Problem::textbook()).unwrap()).unwrap();

        let problem = Problem::load(&path).unwrap();

        assert_eq!(problem, Problem::textbook());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Problem::load("/nonexistent/problem.json").unwrap_err();

        assert!(err.to_string().contains("/nonexistent/problem.json"));
    }
}
