//! Built-in problems with known outcomes.

use crate::problem::Problem;
use banker_core::{Matrix, ResourceVector};

/// What a correct simulator must report for a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    /// Expected safety verdict
    pub safe: bool,

    /// Exact sequence, when the scenario pins one down
    pub sequence: Option<Vec<usize>>,
}

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// BKR-001: five processes, three resources, the classic example
    Textbook,

    /// BKR-002: the only process needs more than will ever be available
    NoFit,

    /// BKR-003: one process that already holds its maximum
    Trivial,

    /// BKR-004: every need fits the initial pool
    AllEligible,

    /// BKR-005: one process finishes, then the rest stall
    PartialStall,

    /// BKR-006: a process only becomes eligible on the second pass
    MultiPass,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Textbook,
            ScenarioId::NoFit,
            ScenarioId::Trivial,
            ScenarioId::AllEligible,
            ScenarioId::PartialStall,
            ScenarioId::MultiPass,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Textbook => "textbook",
            ScenarioId::NoFit => "no_fit",
            ScenarioId::Trivial => "trivial",
            ScenarioId::AllEligible => "all_eligible",
            ScenarioId::PartialStall => "partial_stall",
            ScenarioId::MultiPass => "multi_pass",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Textbook => "5 processes x 3 resources, safe via P1 P3 P4 P0 P2",
            ScenarioId::NoFit => "single process whose need exceeds the pool",
            ScenarioId::Trivial => "single process with zero need",
            ScenarioId::AllEligible => "every process fits at once, index order wins",
            ScenarioId::PartialStall => "P0 finishes, remaining processes starve",
            ScenarioId::MultiPass => "P0 waits for P1's release on pass two",
        }
    }

    /// Builds the scenario's input.
    pub fn problem(&self) -> Problem {
        match self {
            ScenarioId::Textbook => Problem::textbook(),
            ScenarioId::NoFit => Problem::new(
                Matrix::from(vec![vec![1, 0]]),
                Matrix::from(vec![vec![5, 1]]),
                ResourceVector::from(vec![2, 1]),
            ),
            ScenarioId::Trivial => Problem::new(
                Matrix::from(vec![vec![2, 1]]),
                Matrix::from(vec![vec![2, 1]]),
                ResourceVector::from(vec![0, 0]),
            ),
            ScenarioId::AllEligible => Problem::new(
                Matrix::from(vec![vec![1, 0], vec![0, 1], vec![1, 1], vec![0, 0]]),
                Matrix::from(vec![vec![2, 0], vec![0, 2], vec![1, 2], vec![1, 1]]),
                ResourceVector::from(vec![1, 1]),
            ),
            ScenarioId::PartialStall => Problem::new(
                Matrix::from(vec![vec![1, 0], vec![1, 1], vec![0, 1]]),
                Matrix::from(vec![vec![1, 1], vec![4, 3], vec![5, 1]]),
                ResourceVector::from(vec![0, 1]),
            ),
            ScenarioId::MultiPass => Problem::new(
                Matrix::from(vec![vec![0, 0], vec![1, 1]]),
                Matrix::from(vec![vec![2, 2], vec![1, 2]]),
                ResourceVector::from(vec![1, 1]),
            ),
        }
    }

    /// Returns the outcome the simulator must produce.
    pub fn expectation(&self) -> Expectation {
        let (safe, sequence) = match self {
            ScenarioId::Textbook => (true, vec![1, 3, 4, 0, 2]),
            ScenarioId::NoFit => (false, vec![]),
            ScenarioId::Trivial => (true, vec![0]),
            ScenarioId::AllEligible => (true, vec![0, 1, 2, 3]),
            ScenarioId::PartialStall => (false, vec![0]),
            ScenarioId::MultiPass => (true, vec![1, 0]),
        };
        Expectation {
            safe,
            sequence: Some(sequence),
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "textbook" | "bkr-001" => Ok(ScenarioId::Textbook),
            "no_fit" | "nofit" | "bkr-002" => Ok(ScenarioId::NoFit),
            "trivial" | "bkr-003" => Ok(ScenarioId::Trivial),
            "all_eligible" | "alleligible" | "bkr-004" => Ok(ScenarioId::AllEligible),
            "partial_stall" | "partialstall" | "bkr-005" => Ok(ScenarioId::PartialStall),
            "multi_pass" | "multipass" | "bkr-006" => Ok(ScenarioId::MultiPass),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_from_str() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
        }
    }

    #[test]
    fn test_aliases_are_case_insensitive() {
        assert_eq!("BKR-004".parse::<ScenarioId>(), Ok(ScenarioId::AllEligible));
        assert_eq!("MultiPass".parse::<ScenarioId>(), Ok(ScenarioId::MultiPass));
        assert!("deadlock".parse::<ScenarioId>().is_err());
    }

    #[test]
    fn test_every_scenario_is_valid_input() {
        for scenario in ScenarioId::all() {
            assert!(scenario.problem().solve().is_ok(), "{} rejected", scenario);
        }
    }
}
