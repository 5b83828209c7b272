//! Visit repository for `PostgreSQL`.
//!
//! Line items are a JSONB array on the visit row. Appending an item and
//! bumping the total happen in one `UPDATE`, so concurrent add-product calls
//! against the same visit never lose each other's writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use shoptrail_core::{Price, VisitId};

use super::{RepositoryError, VisitStore};
use crate::models::{LineItem, Visit};

const VISIT_COLUMNS: &str = "id, user_ref, shop_id, entered_at, exited_at, items, total";

#[derive(sqlx::FromRow)]
struct VisitRow {
    id: Uuid,
    user_ref: String,
    shop_id: String,
    entered_at: DateTime<Utc>,
    exited_at: Option<DateTime<Utc>>,
    items: Json<Vec<LineItem>>,
    total: Decimal,
}

impl From<VisitRow> for Visit {
    fn from(row: VisitRow) -> Self {
        Self {
            id: VisitId::from_uuid(row.id),
            user: row.user_ref,
            shop_id: row.shop_id,
            entered_at: row.entered_at,
            exited_at: row.exited_at,
            items: row.items.0,
            total: Price::from_stored(row.total),
        }
    }
}

/// Repository for visit database operations.
pub struct PgVisitRepository {
    pool: PgPool,
}

impl PgVisitRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitStore for PgVisitRepository {
    async fn create(&self, visit: &Visit) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO shoptrail.visits
                (id, user_ref, shop_id, entered_at, exited_at, items, total)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(visit.id)
        .bind(&visit.user)
        .bind(&visit.shop_id)
        .bind(visit.entered_at)
        .bind(visit.exited_at)
        .bind(Json(&visit.items))
        .bind(visit.total.amount())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: VisitId) -> Result<Option<Visit>, RepositoryError> {
        let row = sqlx::query_as::<_, VisitRow>(&format!(
            "SELECT {VISIT_COLUMNS} FROM shoptrail.visits WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Visit::from))
    }

    async fn append_item(&self, id: VisitId, item: &LineItem) -> Result<Visit, RepositoryError> {
        let row = sqlx::query_as::<_, VisitRow>(&format!(
            r"
            UPDATE shoptrail.visits
            SET items = items || jsonb_build_array($2::jsonb),
                total = total + $3,
                updated_at = NOW()
            WHERE id = $1 AND total + $3 <= $4
            RETURNING {VISIT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(Json(item))
        .bind(item.price.amount())
        .bind(Decimal::from(Price::MAX_AMOUNT))
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        // Nothing updated: either the visit is missing or the total is capped.
        match self.get(id).await? {
            Some(_) => Err(RepositoryError::OutOfRange),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn mark_exited(
        &self,
        id: VisitId,
        exited_at: DateTime<Utc>,
    ) -> Result<Visit, RepositoryError> {
        let row = sqlx::query_as::<_, VisitRow>(&format!(
            r"
            UPDATE shoptrail.visits
            SET exited_at = $2, updated_at = NOW()
            WHERE id = $1 AND exited_at IS NULL
            RETURNING {VISIT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(exited_at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        // Nothing updated: either the visit is missing or it already exited.
        match self.get(id).await? {
            Some(_) => Err(RepositoryError::Conflict("visit already exited".to_owned())),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn list_recent_first(&self) -> Result<Vec<Visit>, RepositoryError> {
        let rows = sqlx::query_as::<_, VisitRow>(&format!(
            "SELECT {VISIT_COLUMNS} FROM shoptrail.visits ORDER BY entered_at DESC, created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Visit::from).collect())
    }
}
