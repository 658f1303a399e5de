//! Repository for the `goals` table.

use splitsave_core::goal_prioritization::GoalPriority;
use splitsave_core::types::DbId;
use sqlx::PgPool;

use crate::models::goal::{CreateGoal, Goal, UpdateGoal};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, partnership_id, name, description, target_amount, current_amount, \
                       target_date, priority, category, completed_at, created_at, updated_at";

/// Provides CRUD operations for savings goals.
pub struct GoalRepo;

impl GoalRepo {
    /// Insert a new goal. A goal created already funded is marked completed.
    pub async fn create(
        pool: &PgPool,
        partnership_id: DbId,
        input: &CreateGoal,
    ) -> Result<Goal, sqlx::Error> {
        let query = format!(
            "INSERT INTO goals
                (partnership_id, name, description, target_amount, current_amount,
                 target_date, priority, category, completed_at)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), $6, COALESCE($7, 3), COALESCE($8, 'general'),
                     CASE WHEN COALESCE($5, 0) >= $4 THEN NOW() END)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Goal>(&query)
            .bind(partnership_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.target_amount)
            .bind(input.current_amount)
            .bind(input.target_date)
            .bind(input.priority.map(GoalPriority::level))
            .bind(&input.category)
            .fetch_one(pool)
            .await
    }

    /// Find a goal by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Goal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM goals WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Goal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a partnership's goals, most urgent first.
    pub async fn list_by_partnership(pool: &PgPool, partnership_id: DbId) -> Result<Vec<Goal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM goals
             WHERE partnership_id = $1 AND deleted_at IS NULL
             ORDER BY priority ASC, target_date ASC NULLS LAST, id ASC"
        );
        sqlx::query_as::<_, Goal>(&query)
            .bind(partnership_id)
            .fetch_all(pool)
            .await
    }

    /// Update a goal. Only non-`None` fields in `input` are applied.
    ///
    /// `target_date` uses `Option<Option<NaiveDate>>` so the deadline can be
    /// cleared. `completed_at` follows the new target: raising it above the saved
    /// amount reopens the goal.
    pub async fn update(pool: &PgPool, id: DbId, input: &UpdateGoal) -> Result<Option<Goal>, sqlx::Error> {
        let query = format!(
            "UPDATE goals SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                target_amount = COALESCE($4, target_amount),
                target_date = CASE WHEN $5 THEN $6 ELSE target_date END,
                priority = COALESCE($7, priority),
                category = COALESCE($8, category),
                completed_at = CASE
                    WHEN current_amount >= COALESCE($4, target_amount) THEN COALESCE(completed_at, NOW())
                    ELSE NULL
                END
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Goal>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.target_amount)
            .bind(input.target_date.is_some())
            .bind(input.target_date.flatten())
            .bind(input.priority.map(GoalPriority::level))
            .bind(&input.category)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a goal by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE goals SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of goals ever created by the partnership, deleted ones included.
    pub async fn count_created(pool: &PgPool, partnership_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM goals WHERE partnership_id = $1")
            .bind(partnership_id)
            .fetch_one(pool)
            .await
    }

    pub async fn count_completed(pool: &PgPool, partnership_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM goals WHERE partnership_id = $1 AND completed_at IS NOT NULL",
        )
        .bind(partnership_id)
        .fetch_one(pool)
        .await
    }

    /// Sum of `current_amount` over the partnership's live goals.
    pub async fn total_saved(pool: &PgPool, partnership_id: DbId) -> Result<f64, sqlx::Error> {
        let total: Option<f64> = sqlx::query_scalar(
            "SELECT SUM(current_amount) FROM goals WHERE partnership_id = $1 AND deleted_at IS NULL",
        )
        .bind(partnership_id)
        .fetch_one(pool)
        .await?;
        Ok(total.unwrap_or(0.0))
    }
}
