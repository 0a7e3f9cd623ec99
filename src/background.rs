use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio::time::sleep;
use tracing::{error, info, info_span, Instrument};
use crate::state::AppState;

/// Periodically completes assignments whose event date has passed.
pub async fn start_completion_worker(state: Arc<AppState>) {
    let interval = Duration::from_secs(state.config.completion_sweep_secs);
    info!("Starting completion sweep every {:?}", interval);

    loop {
        run_completion_sweep(&state).await;
        sleep(interval).await;
    }
}

/// One pass of the sweep. Returns how many assignments were completed.
pub async fn run_completion_sweep(state: &AppState) -> u64 {
    let today = Utc::now().date_naive();
    let span = info_span!("completion_sweep", today = %today);

    async move {
        match state.assignment_service.complete_past(today).await {
            Ok(0) => 0,
            Ok(count) => {
                info!("Completed {} assignments for past events", count);
                count
            }
            Err(e) => {
                error!("Completion sweep failed: {:?}", e);
                0
            }
        }
    }
        .instrument(span)
        .await
}
