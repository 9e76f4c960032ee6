//! Concurrent launch and completion tracking.

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::machine;
use crate::probe::Prober;
use crate::state::PanelState;

/// Run every target's state machine to completion.
///
/// All machines launch at once with no admission control. Resolution means
/// every target reached a terminal status and, for up targets, every
/// follow-up probe resolved (machines await their own follow-ups). A failed
/// machine task is logged and never aborts its siblings.
pub async fn run(panel: Arc<PanelState>, prober: Arc<dyn Prober>, max_attempts: u32) {
    let mut machines = JoinSet::new();
    for index in 0..panel.len() {
        machines.spawn(machine::run_target(
            Arc::clone(&panel),
            index,
            Arc::clone(&prober),
            max_attempts,
        ));
    }

    while let Some(joined) = machines.join_next().await {
        if let Err(err) = joined {
            tracing::error!(%err, "target state machine task failed");
        }
    }
}
