//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::{AllocationTx, LinkRepository};
use crate::error::AppError;

/// Advisory lock key shared by every process allocating codes in one database.
const ALLOCATION_LOCK_KEY: i64 = 0x5345_514c_494e_4b;

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: String,
    url: String,
    click_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link::new(r.id, r.url, r.click_count, r.created_at, r.updated_at)
    }
}

/// PostgreSQL repository for link storage and code allocation.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Allocation scope backed by a database transaction.
///
/// The transaction takes a transaction-scoped advisory lock as soon as it opens,
/// which also covers an empty table where `FOR UPDATE` would lock nothing. Dropping the
/// scope without committing rolls the transaction back.
struct PgAllocationTx {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgAllocationTx {
    fn tx(&mut self) -> Result<&mut Transaction<'static, Postgres>, AppError> {
        self.tx
            .as_mut()
            .ok_or_else(|| AppError::internal("Allocation scope already closed", json!({})))
    }
}

#[async_trait]
impl AllocationTx for PgAllocationTx {
    async fn locked_max_link(&mut self) -> Result<Option<Link>, AppError> {
        let tx = self.tx()?;

        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, url, click_count, created_at, updated_at
            FROM links
            ORDER BY seq DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.map(Link::from))
    }

    async fn insert_link(&mut self, new_link: NewLink) -> Result<Link, AppError> {
        let tx = self.tx()?;

        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (id, url)
            VALUES ($1, $2)
            RETURNING id, url, click_count, created_at, updated_at
            "#,
        )
        .bind(&new_link.id)
        .bind(&new_link.url)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row.into())
    }

    async fn commit(&mut self) -> Result<(), AppError> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| AppError::internal("Allocation scope already closed", json!({})))?;
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn begin_allocation(&self) -> Result<Box<dyn AllocationTx>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ALLOCATION_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        Ok(Box::new(PgAllocationTx { tx: Some(tx) }))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, url, click_count, created_at, updated_at
            FROM links
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn list_all(&self) -> Result<Vec<Link>, AppError> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, url, click_count, created_at, updated_at
            FROM links
            ORDER BY seq
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
