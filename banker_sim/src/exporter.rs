//! JSON exporter for step-by-step replay.
//!
//! Exports a simulation trace as JSON for external renderers.

use crate::error::SimError;
use banker_core::{SafetyReport, Step};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Complete trace export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceExport {
    /// Scenario or problem name
    pub label: String,

    /// Seed used for generated problems
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Safety verdict
    pub safe: bool,

    /// Safe (or partial) sequence
    pub sequence: Vec<usize>,

    /// Human-readable sequence, e.g. `P1 → P3 → P4`
    pub sequence_label: String,

    /// All snapshots, in order
    pub steps: Vec<Step>,
}

impl TraceExport {
    /// Builds an export from a finished report.
    pub fn from_report(label: &str, seed: Option<u64>, report: &SafetyReport) -> Self {
        Self {
            label: label.to_string(),
            seed,
            safe: report.safe,
            sequence: report.sequence.clone(),
            sequence_label: report.sequence_label(),
            steps: report.steps.clone(),
        }
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path).map_err(|e| SimError::io(path.display(), e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| SimError::io(path.display(), e))?;
        Ok(())
    }

    /// Reads an export back from a JSON file.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| SimError::io(path.display(), e))?;
        Ok(serde_json::from_str(&json)?)
    }
}
