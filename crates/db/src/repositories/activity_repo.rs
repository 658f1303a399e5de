//! Repository for the append-only `activities` table.

use splitsave_core::types::DbId;
use sqlx::PgPool;

use crate::models::activity::{Activity, NewActivity};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, partnership_id, user_id, activity_type, entity_type, entity_id, details, created_at";

/// Provides append and feed queries for activities.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Append an entry to the partnership's feed.
    pub async fn log(pool: &PgPool, input: &NewActivity) -> Result<Activity, sqlx::Error> {
        let query = format!(
            "INSERT INTO activities
                (partnership_id, user_id, activity_type, entity_type, entity_id, details)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(input.partnership_id)
            .bind(input.user_id)
            .bind(input.activity_type.as_str())
            .bind(input.activity_type.entity_type())
            .bind(input.entity_id)
            .bind(&input.details)
            .fetch_one(pool)
            .await
    }

    /// Newest-first page of the partnership's feed.
    pub async fn list_by_partnership(
        pool: &PgPool,
        partnership_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Activity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activities
             WHERE partnership_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(partnership_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_partnership(pool: &PgPool, partnership_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM activities WHERE partnership_id = $1")
            .bind(partnership_id)
            .fetch_one(pool)
            .await
    }
}
