//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{ClickEvent, NewClickEvent};
use crate::domain::repositories::{ClickRepository, PendingClick, ReferrerCount};
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ClickRow {
    id: i64,
    link_id: String,
    referer: String,
    clicked_at: DateTime<Utc>,
}

/// PostgreSQL repository for click tracking and referrer analytics.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn insert_click(&self, new_click: NewClickEvent) -> Result<ClickEvent, AppError> {
        let row = sqlx::query_as::<_, ClickRow>(
            r#"
            INSERT INTO click_events (link_id, referer)
            VALUES ($1, $2)
            RETURNING id, link_id, referer, clicked_at
            "#,
        )
        .bind(&new_click.link_id)
        .bind(&new_click.referer)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(ClickEvent::new(
            row.id,
            row.link_id,
            row.referer,
            row.clicked_at,
        ))
    }

    async fn apply_click(&self, click_id: i64) -> Result<bool, AppError> {
        // Marking the event and bumping the counter happen in one statement.
        let result = sqlx::query(
            r#"
            WITH marked AS (
                UPDATE click_events
                SET counted = TRUE
                WHERE id = $1 AND counted = FALSE
                RETURNING link_id
            )
            UPDATE links
            SET click_count = links.click_count + 1, updated_at = NOW()
            FROM marked
            WHERE links.id = marked.link_id
            "#,
        )
        .bind(click_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn top_referrers(&self, limit: i64) -> Result<Vec<ReferrerCount>, AppError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT referer, COUNT(*) AS count
            FROM click_events
            GROUP BY referer
            ORDER BY COUNT(*) DESC, referer COLLATE "C" ASC
            LIMIT $1
            "#,
        )
        .bind(limit.max(0))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(referer, count)| ReferrerCount { referer, count })
            .collect())
    }

    async fn uncounted_clicks(
        &self,
        recorded_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<PendingClick>, AppError> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            r#"
            SELECT id, link_id
            FROM click_events
            WHERE counted = FALSE AND clicked_at < $1
            ORDER BY id
            LIMIT $2
            "#,
        )
        .bind(recorded_before)
        .bind(limit.max(0))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(click_id, link_id)| PendingClick { click_id, link_id })
            .collect())
    }

    async fn count_for_link(&self, link_id: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM click_events WHERE link_id = $1")
            .bind(link_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
