//! Banker's Algorithm Core - Deadlock-Avoidance Safety Simulation
//!
//! Given the allocation matrix, the maximum-demand matrix and the available
//! vector, [`simulate`] decides whether the system is in a safe state, derives
//! a safe sequence, and records a replayable trace of every intermediate
//! state (allocation, need, available and work at each step).
//!
//! The engine is a pure, synchronous function over owned copies of its input.
//! Every [`Step`] owns its matrices, so a trace can be handed to a renderer
//! and replayed with [`PlaybackController`] long after the run.

pub mod playback;
pub mod resources;
pub mod safety;
pub mod validation;

// Re-export key types for convenience
pub use playback::{allocation_delta, PlaybackController, Transition};
pub use resources::{Matrix, ResourceVector, Units};
pub use safety::{simulate, SafetyReport, Step};
pub use validation::{validate, MatrixKind, ProblemError};
