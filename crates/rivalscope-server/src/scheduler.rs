//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! weekly intelligence sweep.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::AppState;
use crate::sweep;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(state: AppState) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_sweep_job(&scheduler, state).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the weekly sweep job.
///
/// Runs every Sunday at 03:00 UTC (`0 0 3 * * SUN`): every scan type of
/// every actively-tracked entity goes through `ensure_fresh`, so Monday
/// morning insight requests are served warm.
async fn register_sweep_job(
    scheduler: &JobScheduler,
    state: AppState,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async("0 0 3 * * SUN", move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting weekly intelligence sweep");
            let summary = sweep::run_sweep(&state).await;
            tracing::info!(
                entities = summary.entities,
                fresh = summary.fresh,
                degraded = summary.degraded,
                unavailable = summary.unavailable,
                "scheduler: weekly intelligence sweep complete"
            );
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
