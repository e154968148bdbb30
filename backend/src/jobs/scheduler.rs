use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::AppState;

pub async fn start_scheduler(state: Arc<AppState>) {
    let sched = match JobScheduler::new().await {
        Ok(sched) => sched,
        Err(e) => {
            error!("Failed to create scheduler: {}", e);
            return;
        }
    };

    // Every ten minutes, forget addresses whose submission budget has refilled
    let state_clone = Arc::clone(&state);
    let prune_job = Job::new_async("0 */10 * * * *", move |_, _| {
        let state = state_clone.clone();
        Box::pin(async move {
            state.rate_limiter.retain_recent();
            info!(
                "Pruned lead rate limiter, {} addresses still tracked",
                state.rate_limiter.tracked()
            );
        })
    });

    match prune_job {
        Ok(job) => {
            if let Err(e) = sched.add(job).await {
                error!("Failed to add rate limiter prune job: {}", e);
                return;
            }
        }
        Err(e) => {
            error!("Failed to create rate limiter prune job: {}", e);
            return;
        }
    }

    if let Err(e) = sched.start().await {
        error!("Failed to start scheduler: {}", e);
    }
}
