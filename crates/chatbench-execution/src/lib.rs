//! Batch execution: runs the full prompt x context matrix through one
//! conversation and records every response.

pub mod sweep;

pub use sweep::{BatchRunner, SweepEvent, SweepSummary};
pub use tokio_util::sync::CancellationToken;
