//! assetgate command-line interface.
//!
//! Wires the pieces together: intake validation for submitted files, the
//! scene-snapshot production adapter, the pipeline orchestrator, and report
//! output. The `assetgate` binary lives in `main.rs`; everything here is
//! library code so integration tests can drive the same paths.

pub mod commands;
pub mod intake;
pub mod output;
pub mod pipeline;
pub mod snapshot;

pub use intake::{run_intake, IntakeConfig, IntakeOutcome};
pub use pipeline::{run_checks, run_qa, QaRunOutcome};
pub use snapshot::{SceneSnapshot, SnapshotError};
