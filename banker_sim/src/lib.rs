//! Banker's Algorithm Simulation Harness
//!
//! This crate wraps the `banker_core` engine with everything needed to run
//! and trust it from the command line:
//! - **Problems**: JSON problem files and built-in scenarios with known outcomes
//! - **Generator**: seeded random problems, reproducible from a 64-bit seed
//! - **Oracle**: exhaustive safe-state search plus trace invariant checks
//! - **Playback**: text rendering, timed auto-advance and JSON trace export
//!
//! # Usage
//!
//! ```ignore
//! use banker_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let runner = ScenarioRunner::new();
//! let result = runner.run(ScenarioId::Textbook);
//! assert!(result.passed);
//!
//! // Sweep generated problems
//! for seed in 0..100 {
//!     assert!(runner.run_random(seed).passed);
//! }
//! ```

mod error;
mod exporter;
mod generator;
mod oracle;
mod problem;
mod runner;
pub mod player;
pub mod report;
pub mod scenarios;

pub use error::SimError;
pub use exporter::TraceExport;
pub use generator::ProblemGenerator;
pub use oracle::{InvariantViolation, Oracle};
pub use problem::Problem;
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
