//! Cron wiring: registers one recurring reconciliation job per snapshot
//! source and starts the job scheduler.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};

use crate::error::Error;
use crate::model::snapshot::IngestSource;

use super::config::{chat_platform, client_export, game_api};
use super::Scheduler;

macro_rules! add_run_job {
    ($sched:expr, $cron:expr, $orchestrator:expr, $source:expr) => {{
        let orchestrator = Arc::clone(&$orchestrator);

        $sched
            .add(Job::new_async($cron, move |_, _| {
                let orchestrator = Arc::clone(&orchestrator);

                Box::pin(async move {
                    match orchestrator.run_once($source).await {
                        Ok(run) => tracing::info!(
                            "Scheduled {} run {} finished as {}",
                            $source,
                            run.id,
                            run.status
                        ),
                        Err(e) => tracing::error!("Error running {} sync: {:?}", $source, e),
                    }
                })
            })?)
            .await?;
    }};
}

/// Initialize and start the cron job scheduler. The returned handle keeps
/// the jobs alive; dropping it stops them.
pub async fn start_scheduler(orchestrator: Arc<Scheduler>) -> Result<JobScheduler, Error> {
    let sched = JobScheduler::new().await?;

    add_run_job!(
        sched,
        game_api::CRON_EXPRESSION,
        orchestrator,
        IngestSource::GameApi
    );

    add_run_job!(
        sched,
        client_export::CRON_EXPRESSION,
        orchestrator,
        IngestSource::ClientExport
    );

    add_run_job!(
        sched,
        chat_platform::CRON_EXPRESSION,
        orchestrator,
        IngestSource::ChatPlatform
    );

    sched.start().await?;
    Ok(sched)
}
