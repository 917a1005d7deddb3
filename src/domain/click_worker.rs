//! Background application of click counter increments.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, warn};

use crate::domain::counter_increment::CounterIncrement;
use crate::domain::repositories::ClickRepository;

/// Largest number of uncounted clicks re-queued per reconciliation pass.
const RECONCILE_BATCH_SIZE: i64 = 500;

/// Tuning for [`run_click_worker`].
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Maximum number of increments applied concurrently.
    pub concurrency: usize,
    /// Retries after the first failed attempt before giving up on a job.
    pub max_retries: usize,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_retries: 3,
        }
    }
}

/// Consumes counter increments until every sender is dropped.
///
/// Each job is applied on its own task, at most `options.concurrency` at a
/// time, retrying with jittered exponential backoff. A job that still fails
/// is logged and dropped; its click stays uncounted and
/// [`run_reconciler`] queues it again later. In-flight jobs are drained
/// before the function returns.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<CounterIncrement>,
    repository: Arc<dyn ClickRepository>,
    options: WorkerOptions,
) {
    let permits = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    while let Some(job) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let repository = repository.clone();
        let max_retries = options.max_retries;
        in_flight.spawn(async move {
            let _permit = permit;
            apply_with_retry(repository.as_ref(), job, max_retries).await;
        });

        while in_flight.try_join_next().is_some() {}
    }

    while in_flight.join_next().await.is_some() {}
    info!("Click worker stopped");
}

async fn apply_with_retry(repository: &dyn ClickRepository, job: CounterIncrement, max_retries: usize) {
    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(2))
        .map(jitter)
        .take(max_retries);

    let result = Retry::spawn(strategy, || repository.apply_click(job.click_id)).await;

    match result {
        Ok(true) => {
            metrics::counter!("click_increments_applied_total").increment(1);
            debug!(click_id = job.click_id, link_id = %job.link_id, "Click counted");
        }
        Ok(false) => {
            debug!(click_id = job.click_id, "Click already counted");
        }
        Err(e) => {
            metrics::counter!("click_increment_failures_total").increment(1);
            error!(
                click_id = job.click_id,
                link_id = %job.link_id,
                error = %e,
                "Failed to increment click count"
            );
        }
    }
}

/// Periodically re-queues clicks whose increment never landed.
///
/// Only clicks older than one `interval` are considered, which leaves
/// recently queued jobs to the worker. Returns when the queue is closed.
pub async fn run_reconciler(
    repository: Arc<dyn ClickRepository>,
    sender: mpsc::Sender<CounterIncrement>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let Ok(grace) = chrono::Duration::from_std(interval) else {
            error!("Reconcile interval out of range, stopping reconciler");
            return;
        };
        let cutoff = chrono::Utc::now() - grace;

        match repository
            .uncounted_clicks(cutoff, RECONCILE_BATCH_SIZE)
            .await
        {
            Ok(pending) if pending.is_empty() => {}
            Ok(pending) => {
                info!(count = pending.len(), "Re-queueing uncounted clicks");
                for click in pending {
                    if sender.send(click.into()).await.is_err() {
                        return;
                    }
                }
            }
            Err(e) => warn!(error = %e, "Failed to load uncounted clicks"),
        }
    }
}
