use log::{log_enabled, Level};
use std::time::{Duration, Instant};

/// Trace span around one stage of the step pipeline (broadphase,
/// narrowphase, solver, integrate). Logs on drop; free when trace logging
/// is disabled.
pub struct StageSpan {
    stage: &'static str,
    start: Instant,
}

impl StageSpan {
    pub fn enter(stage: &'static str) -> Self {
        Self {
            stage,
            start: Instant::now(),
        }
    }
}

impl Drop for StageSpan {
    fn drop(&mut self) {
        if log_enabled!(Level::Trace) {
            log::trace!(
                "{} stage: {} µs",
                self.stage,
                self.start.elapsed().as_micros()
            );
        }
    }
}

/// Warns when one simulation step costs more wall time than the fixed
/// delta it simulates — the precursor to the accumulator falling behind
/// and time being dropped.
pub fn warn_if_step_over_budget(cost: Duration, dt: f32) {
    let cost_seconds = cost.as_secs_f32();
    if cost_seconds > dt {
        log::warn!(
            "step cost {:.2} ms against a {:.2} ms budget",
            cost_seconds * 1000.0,
            dt * 1000.0
        );
    }
}

/// Critical diagnostic emitted when the accumulator exceeds the bounded
/// catch-up cap and simulated time has to be dropped.
pub fn report_overload(dropped_seconds: f32) {
    log::error!(
        "physics too slow to run in real time, dropping {:.4} s of simulated time",
        dropped_seconds
    );
}
