//! Probe execution orchestration.
//!
//! The [`Engine`] resolves every selected check once, then runs each
//! (repository, check) pair on a bounded worker pool with a per-probe
//! timeout. A [`CancellationToken`] stops the run early.

pub mod cancel;
pub mod engine;
pub mod guard;

pub use cancel::CancellationToken;
pub use engine::{
    Engine, ProbeResult, RunOptions, RunProgress, RunResults, DEFAULT_TIMEOUT, DEFAULT_WORKERS,
};
pub use guard::{run_guarded, ERROR_EXCEPTION};
