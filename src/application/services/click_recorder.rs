//! Click recording and referrer analytics service.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::domain::counter_increment::CounterIncrement;
use crate::domain::entities::{ClickEvent, NewClickEvent};
use crate::domain::repositories::{ClickRepository, ReferrerCount};
use crate::error::AppError;

/// Records redirects and answers referrer aggregates.
///
/// The click event is written before the redirect response goes out; the
/// counter increment is queued for [`crate::domain::click_worker`] and never
/// waited on. Failures on this path are logged and absorbed.
pub struct ClickRecorder {
    repository: Arc<dyn ClickRepository>,
    increments: mpsc::Sender<CounterIncrement>,
}

impl ClickRecorder {
    /// Creates a new recorder feeding the given increment queue.
    pub fn new(
        repository: Arc<dyn ClickRepository>,
        increments: mpsc::Sender<CounterIncrement>,
    ) -> Self {
        Self {
            repository,
            increments,
        }
    }

    /// Records one click on `link_id` and queues its counter increment.
    ///
    /// Returns the persisted event, or `None` if the insert failed. A full or
    /// closed queue leaves the event uncounted for the reconciler to pick up.
    pub async fn record_click(&self, link_id: &str, referer: &str) -> Option<ClickEvent> {
        let new_click = NewClickEvent {
            link_id: link_id.to_string(),
            referer: referer.to_string(),
        };

        let event = match self.repository.insert_click(new_click).await {
            Ok(event) => event,
            Err(e) => {
                metrics::counter!("click_event_failures_total").increment(1);
                warn!(link_id, error = %e, "Failed to record click event");
                return None;
            }
        };
        metrics::counter!("click_events_recorded_total").increment(1);

        match self
            .increments
            .try_send(CounterIncrement::new(event.id, event.link_id.clone()))
        {
            Ok(()) => debug!(click_id = event.id, "Click increment queued"),
            Err(TrySendError::Full(job)) => {
                metrics::counter!("click_queue_rejections_total").increment(1);
                warn!(
                    click_id = job.click_id,
                    "Click queue full, increment deferred to reconciliation"
                );
            }
            Err(TrySendError::Closed(job)) => {
                metrics::counter!("click_queue_rejections_total").increment(1);
                warn!(click_id = job.click_id, "Click queue closed");
            }
        }

        Some(event)
    }

    /// Returns the `limit` most frequent referers.
    ///
    /// Ties are ordered by referer, ascending. A non-positive `limit` yields
    /// an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on database errors.
    pub async fn top_referrers(&self, limit: i64) -> Result<Vec<ReferrerCount>, AppError> {
        if limit <= 0 {
            return Ok(Vec::new());
        }
        self.repository.top_referrers(limit).await
    }

    /// Returns true once the increment worker has shut down.
    pub fn is_queue_closed(&self) -> bool {
        self.increments.is_closed()
    }

    /// Free slots left in the increment queue.
    pub fn queue_capacity(&self) -> usize {
        self.increments.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockClickRepository;
    use chrono::Utc;
    use serde_json::json;

    fn stored(id: i64, link_id: &str, referer: &str) -> ClickEvent {
        ClickEvent::new(id, link_id.to_string(), referer.to_string(), Utc::now())
    }

    #[tokio::test]
    async fn test_record_click_persists_then_queues_increment() {
        let mut mock_repo = MockClickRepository::new();
        mock_repo
            .expect_insert_click()
            .withf(|c| c.link_id == "0001" && c.referer == "https://google.com")
            .times(1)
            .returning(|c| Ok(stored(11, &c.link_id, &c.referer)));

        let (tx, mut rx) = mpsc::channel(8);
        let recorder = ClickRecorder::new(Arc::new(mock_repo), tx);

        let event = recorder
            .record_click("0001", "https://google.com")
            .await
            .unwrap();

        assert_eq!(event.id, 11);
        assert_eq!(rx.try_recv().unwrap(), CounterIncrement::new(11, "0001"));
    }

    #[tokio::test]
    async fn test_record_click_insert_failure_is_absorbed() {
        let mut mock_repo = MockClickRepository::new();
        mock_repo
            .expect_insert_click()
            .times(1)
            .returning(|_| Err(AppError::store("Database error", json!({}))));

        let (tx, mut rx) = mpsc::channel(8);
        let recorder = ClickRecorder::new(Arc::new(mock_repo), tx);

        assert!(recorder.record_click("0001", "").await.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_record_click_does_not_block_on_full_queue() {
        let mut mock_repo = MockClickRepository::new();
        mock_repo
            .expect_insert_click()
            .times(2)
            .returning(|c| Ok(stored(1, &c.link_id, &c.referer)));

        let (tx, _rx) = mpsc::channel(1);
        let recorder = ClickRecorder::new(Arc::new(mock_repo), tx);

        assert!(recorder.record_click("0000", "").await.is_some());
        assert!(recorder.record_click("0000", "").await.is_some());
        assert_eq!(recorder.queue_capacity(), 0);
    }

    #[tokio::test]
    async fn test_record_click_with_closed_queue_still_records() {
        let mut mock_repo = MockClickRepository::new();
        mock_repo
            .expect_insert_click()
            .times(1)
            .returning(|c| Ok(stored(3, &c.link_id, &c.referer)));

        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let recorder = ClickRecorder::new(Arc::new(mock_repo), tx);

        assert!(recorder.is_queue_closed());
        assert!(recorder.record_click("0000", "").await.is_some());
    }

    #[tokio::test]
    async fn test_top_referrers_passes_limit() {
        let mut mock_repo = MockClickRepository::new();
        mock_repo
            .expect_top_referrers()
            .withf(|limit| *limit == 3)
            .times(1)
            .returning(|_| {
                Ok(vec![ReferrerCount {
                    referer: "a".to_string(),
                    count: 5,
                }])
            });

        let (tx, _rx) = mpsc::channel(1);
        let recorder = ClickRecorder::new(Arc::new(mock_repo), tx);

        let top = recorder.top_referrers(3).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].referer, "a");
    }

    #[tokio::test]
    async fn test_top_referrers_zero_limit_skips_store() {
        let mut mock_repo = MockClickRepository::new();
        mock_repo.expect_top_referrers().times(0);

        let (tx, _rx) = mpsc::channel(1);
        let recorder = ClickRecorder::new(Arc::new(mock_repo), tx);

        assert!(recorder.top_referrers(0).await.unwrap().is_empty());
    }
}
