//! Panic isolation for probe invocations.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::probes::{Probe, ProbeReport};

/// Detail recorded when a probe panics.
pub const ERROR_EXCEPTION: &str = "Error exception";

/// Run a probe, turning a panic into an error report.
pub fn run_guarded(probe: &dyn Probe, repo: &str) -> ProbeReport {
    match catch_unwind(AssertUnwindSafe(|| probe.run(repo))) {
        Ok(report) => report,
        Err(payload) => {
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            tracing::error!(repo, panic = %message, "Probe panicked");
            ProbeReport::error(ERROR_EXCEPTION)
        }
    }
}
