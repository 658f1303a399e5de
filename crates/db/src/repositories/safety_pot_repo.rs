//! Repository for the `safety_pots` table.

use splitsave_core::types::DbId;
use sqlx::PgPool;

use crate::models::safety_pot::SafetyPot;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, partnership_id, balance, target_amount, created_at, updated_at";

/// Provides balance operations for the per-partnership safety pot.
pub struct SafetyPotRepo;

impl SafetyPotRepo {
    /// Fetch the partnership's pot, creating an empty one on first access.
    pub async fn get_or_create(pool: &PgPool, partnership_id: DbId) -> Result<SafetyPot, sqlx::Error> {
        sqlx::query(
            "INSERT INTO safety_pots (partnership_id) VALUES ($1)
             ON CONFLICT (partnership_id) DO NOTHING",
        )
        .bind(partnership_id)
        .execute(pool)
        .await?;

        let query = format!("SELECT {COLUMNS} FROM safety_pots WHERE partnership_id = $1");
        sqlx::query_as::<_, SafetyPot>(&query)
            .bind(partnership_id)
            .fetch_one(pool)
            .await
    }

    /// Add `delta` (negative for withdrawals) to the balance.
    ///
    /// The update is guarded so the balance can never drop below zero, even
    /// under concurrent withdrawals. Returns `None` when the guard rejects it.
    pub async fn adjust_balance(
        pool: &PgPool,
        partnership_id: DbId,
        delta: f64,
    ) -> Result<Option<SafetyPot>, sqlx::Error> {
        let query = format!(
            "UPDATE safety_pots SET balance = ROUND((balance + $2)::numeric, 2)::float8
             WHERE partnership_id = $1 AND balance + $2 >= 0
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SafetyPot>(&query)
            .bind(partnership_id)
            .bind(delta)
            .fetch_optional(pool)
            .await
    }

    /// Set or clear the savings target.
    pub async fn set_target(
        pool: &PgPool,
        partnership_id: DbId,
        target_amount: Option<f64>,
    ) -> Result<Option<SafetyPot>, sqlx::Error> {
        let query = format!(
            "UPDATE safety_pots SET target_amount = $2
             WHERE partnership_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SafetyPot>(&query)
            .bind(partnership_id)
            .bind(target_amount)
            .fetch_optional(pool)
            .await
    }
}
