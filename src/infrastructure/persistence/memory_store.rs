//! In-process store implementing both repository traits.
//!
//! Nothing is persisted across restarts. Used by the test suite and by the
//! `memory://` development mode.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::OwnedMutexGuard;

use crate::domain::entities::{ClickEvent, Link, NewClickEvent, NewLink};
use crate::domain::repositories::{
    AllocationTx, ClickRepository, LinkRepository, PendingClick, ReferrerCount,
};
use crate::error::AppError;

#[derive(Debug)]
struct StoredClick {
    event: ClickEvent,
    counted: bool,
}

#[derive(Debug, Default)]
struct Tables {
    /// Links in allocation order.
    links: Vec<Link>,
    positions: HashMap<String, usize>,
    clicks: Vec<StoredClick>,
    last_click_id: i64,
}

fn lock(tables: &Mutex<Tables>) -> MutexGuard<'_, Tables> {
    tables.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    allocation_lock: Arc<tokio::sync::Mutex<()>>,
    link_reads: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of [`LinkRepository::find_by_id`] calls served so far.
    pub fn link_reads(&self) -> usize {
        self.link_reads.load(Ordering::SeqCst)
    }

    /// All click events, oldest first.
    pub fn clicks(&self) -> Vec<ClickEvent> {
        lock(&self.tables)
            .clicks
            .iter()
            .map(|c| c.event.clone())
            .collect()
    }
}

/// Allocation scope holding the store-wide allocation lock.
struct MemoryAllocationTx {
    _guard: OwnedMutexGuard<()>,
    tables: Arc<Mutex<Tables>>,
    staged: Option<Link>,
}

#[async_trait]
impl AllocationTx for MemoryAllocationTx {
    async fn locked_max_link(&mut self) -> Result<Option<Link>, AppError> {
        Ok(lock(&self.tables).links.last().cloned())
    }

    async fn insert_link(&mut self, new_link: NewLink) -> Result<Link, AppError> {
        if self.staged.is_some() || lock(&self.tables).positions.contains_key(&new_link.id) {
            return Err(AppError::store(
                "Unique constraint violation",
                json!({ "constraint": "links_pkey" }),
            ));
        }

        let now = Utc::now();
        let link = Link::new(new_link.id, new_link.url, 0, now, now);
        self.staged = Some(link.clone());
        Ok(link)
    }

    async fn commit(&mut self) -> Result<(), AppError> {
        if let Some(link) = self.staged.take() {
            let mut tables = lock(&self.tables);
            let position = tables.links.len();
            tables.positions.insert(link.id.clone(), position);
            tables.links.push(link);
        }
        Ok(())
    }
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn begin_allocation(&self) -> Result<Box<dyn AllocationTx>, AppError> {
        let guard = self.allocation_lock.clone().lock_owned().await;
        Ok(Box::new(MemoryAllocationTx {
            _guard: guard,
            tables: self.tables.clone(),
            staged: None,
        }))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Link>, AppError> {
        self.link_reads.fetch_add(1, Ordering::SeqCst);
        let tables = lock(&self.tables);
        Ok(tables
            .positions
            .get(id)
            .map(|&position| tables.links[position].clone()))
    }

    async fn list_all(&self) -> Result<Vec<Link>, AppError> {
        Ok(lock(&self.tables).links.clone())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(lock(&self.tables).links.len() as i64)
    }
}

#[async_trait]
impl ClickRepository for MemoryStore {
    async fn insert_click(&self, new_click: NewClickEvent) -> Result<ClickEvent, AppError> {
        let mut tables = lock(&self.tables);

        if !tables.positions.contains_key(&new_click.link_id) {
            return Err(AppError::store(
                "Foreign key violation",
                json!({ "constraint": "click_events_link_id_fkey" }),
            ));
        }

        tables.last_click_id += 1;
        let event = ClickEvent::new(
            tables.last_click_id,
            new_click.link_id,
            new_click.referer,
            Utc::now(),
        );
        tables.clicks.push(StoredClick {
            event: event.clone(),
            counted: false,
        });

        Ok(event)
    }

    async fn apply_click(&self, click_id: i64) -> Result<bool, AppError> {
        let mut guard = lock(&self.tables);
        let tables = &mut *guard;

        let Some(click) = tables
            .clicks
            .iter_mut()
            .find(|c| c.event.id == click_id && !c.counted)
        else {
            return Ok(false);
        };

        let Some(&position) = tables.positions.get(&click.event.link_id) else {
            return Ok(false);
        };

        click.counted = true;
        let link = &mut tables.links[position];
        link.click_count += 1;
        link.updated_at = Utc::now();

        Ok(true)
    }

    async fn top_referrers(&self, limit: i64) -> Result<Vec<ReferrerCount>, AppError> {
        let tables = lock(&self.tables);

        let mut counts: HashMap<&str, i64> = HashMap::new();
        for click in &tables.clicks {
            *counts.entry(click.event.referer.as_str()).or_insert(0) += 1;
        }

        let mut ranked: Vec<ReferrerCount> = counts
            .into_iter()
            .map(|(referer, count)| ReferrerCount {
                referer: referer.to_string(),
                count,
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.referer.cmp(&b.referer)));
        ranked.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(ranked)
    }

    async fn uncounted_clicks(
        &self,
        recorded_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<PendingClick>, AppError> {
        let tables = lock(&self.tables);

        Ok(tables
            .clicks
            .iter()
            .filter(|c| !c.counted && c.event.timestamp < recorded_before)
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|c| PendingClick {
                click_id: c.event.id,
                link_id: c.event.link_id.clone(),
            })
            .collect())
    }

    async fn count_for_link(&self, link_id: &str) -> Result<i64, AppError> {
        Ok(lock(&self.tables)
            .clicks
            .iter()
            .filter(|c| c.event.link_id == link_id)
            .count() as i64)
    }
}
