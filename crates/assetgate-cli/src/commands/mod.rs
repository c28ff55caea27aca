//! Command implementations for the `assetgate` binary.

pub mod check;
pub mod intake;
pub mod snapshot;
