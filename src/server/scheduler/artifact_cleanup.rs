use std::time::Duration;

use tokio_cron_scheduler::{Job, JobScheduler};

use crate::server::{
    error::AppError,
    service::artifact::{ArtifactKind, ArtifactStore},
};

/// Transcripts are public by URL, so they are kept for a bounded window only.
pub const TRANSCRIPT_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Starts the transcript retention scheduler
///
/// This scheduler runs hourly and deletes transcript files older than the
/// seven-day retention window. Running the sweep by file age also collects
/// transcripts whose deletion was lost to a process restart.
///
/// # Arguments
/// - `artifacts`: Artifact store whose transcript directory is swept
pub async fn start_scheduler(artifacts: ArtifactStore) -> Result<(), AppError> {
    let scheduler = JobScheduler::new().await?;

    // Clone resources for the job
    let job_store = artifacts.clone();

    // Schedule job to run at the top of every hour
    let job = Job::new_async("0 0 * * * *", move |_uuid, _lock| {
        let artifacts = job_store.clone();

        Box::pin(async move {
            match artifacts
                .sweep_older_than(ArtifactKind::Transcript, TRANSCRIPT_RETENTION)
                .await
            {
                Ok(0) => {}
                Ok(removed) => {
                    tracing::info!("Deleted {} expired transcript(s)", removed);
                }
                Err(err) => {
                    tracing::error!("Error sweeping expired transcripts: {}", err);
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!("Transcript retention scheduler started");

    Ok(())
}
