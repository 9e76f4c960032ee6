//! Per-target retry and measurement driver.
//!
//! One `run_target` task owns one record. It probes until a non-timeout
//! outcome or the attempt budget is exhausted, and on success issues the
//! follow-up measurement probes concurrently, each bound to its slot at
//! issuance time. It returns only once every follow-up has resolved.

use std::sync::Arc;

use crate::probe::{Outcome, Prober};
use crate::state::{PanelState, MEASUREMENT_SLOTS};

/// Follow-up measurement probes issued after the qualifying success.
pub const FOLLOW_UPS: usize = MEASUREMENT_SLOTS - 1;

/// Drive one target from pending to settled.
pub async fn run_target(
    panel: Arc<PanelState>,
    index: usize,
    prober: Arc<dyn Prober>,
    max_attempts: u32,
) {
    let target = panel.record(index).read().target.clone();
    panel.record(index).write().begin_attempt();

    let qualifying_ms = loop {
        let report = prober.probe(&target).await;
        match report.outcome {
            Outcome::Success => break Some(report.latency_ms()),
            Outcome::Timeout => {
                let attempt = panel.record(index).read().attempt;
                if attempt < max_attempts {
                    tracing::debug!(relay = %target.id, attempt, "attempt timed out, retrying");
                    panel.record(index).write().record_retry();
                } else {
                    tracing::debug!(relay = %target.id, attempt, "attempts exhausted");
                    panel.record(index).write().record_timeout();
                    break None;
                }
            }
            Outcome::Failure(code) => {
                tracing::debug!(relay = %target.id, %code, "definitive failure");
                panel.record(index).write().record_down(code);
                break None;
            }
        }
    };

    let Some(first_ms) = qualifying_ms else { return };
    panel.record(index).write().record_up(first_ms);
    panel.add_in_flight(FOLLOW_UPS);

    // Each follow-up is bound to its slot here, at issuance; completion
    // order never reassigns a result to a different slot.
    let mut follow_ups = Vec::with_capacity(FOLLOW_UPS);
    for slot in 1..MEASUREMENT_SLOTS {
        let panel = Arc::clone(&panel);
        let prober = Arc::clone(&prober);
        let target = target.clone();
        follow_ups.push(tokio::spawn(async move {
            let report = prober.probe(&target).await;
            let sample = match report.outcome {
                Outcome::Success => Some(report.latency_ms()),
                _ => None,
            };
            panel.record(index).write().resolve_slot(slot, sample);
            panel.finish_in_flight();
        }));
    }

    for follow_up in follow_ups {
        let _ = follow_up.await;
    }
}
