//! Repository for the `contributions` table.

use chrono::NaiveDate;
use splitsave_core::types::{DbId, UserId};
use sqlx::PgPool;

use crate::models::contribution::{Contribution, CreateContribution, RecordedContribution};
use crate::models::goal::Goal;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, goal_id, user_id, amount, contributed_on, note, created_at, updated_at";

/// Provides insert and aggregate queries for goal contributions.
pub struct ContributionRepo;

impl ContributionRepo {
    /// Record a contribution and credit it to the goal in one transaction.
    ///
    /// The goal is stamped `completed_at` the first time its balance reaches
    /// the target. Returns `None` if the goal does not exist or was deleted.
    pub async fn create(
        pool: &PgPool,
        goal_id: DbId,
        user_id: UserId,
        input: &CreateContribution,
    ) -> Result<Option<RecordedContribution>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let goal: Option<Goal> = sqlx::query_as(
            "UPDATE goals SET
                current_amount = current_amount + $2,
                completed_at = CASE
                    WHEN completed_at IS NULL AND current_amount + $2 >= target_amount THEN NOW()
                    ELSE completed_at
                END
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING id, partnership_id, name, description, target_amount, current_amount,
                       target_date, priority, category, completed_at, created_at, updated_at",
        )
        .bind(goal_id)
        .bind(input.amount)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(goal) = goal else {
            tx.rollback().await?;
            return Ok(None);
        };

        let query = format!(
            "INSERT INTO contributions (goal_id, user_id, amount, contributed_on, note)
             VALUES ($1, $2, $3, COALESCE($4, CURRENT_DATE), $5)
             RETURNING {COLUMNS}"
        );
        let contribution = sqlx::query_as::<_, Contribution>(&query)
            .bind(goal_id)
            .bind(user_id)
            .bind(input.amount)
            .bind(input.contributed_on)
            .bind(&input.note)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(RecordedContribution { contribution, goal }))
    }

    /// List a goal's contributions, newest first.
    pub async fn list_by_goal(
        pool: &PgPool,
        goal_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Contribution>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contributions
             WHERE goal_id = $1
             ORDER BY contributed_on DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Contribution>(&query)
            .bind(goal_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every contribution to any of the partnership's goals, oldest first.
    ///
    /// Contributions to deleted goals still count as saving behaviour.
    pub async fn list_for_partnership(
        pool: &PgPool,
        partnership_id: DbId,
    ) -> Result<Vec<Contribution>, sqlx::Error> {
        sqlx::query_as::<_, Contribution>(
            "SELECT c.id, c.goal_id, c.user_id, c.amount, c.contributed_on, c.note,
                    c.created_at, c.updated_at
             FROM contributions c
             JOIN goals g ON g.id = c.goal_id
             WHERE g.partnership_id = $1
             ORDER BY c.contributed_on ASC, c.id ASC",
        )
        .bind(partnership_id)
        .fetch_all(pool)
        .await
    }

    /// Total contributed per calendar month from `since`.
    pub async fn monthly_totals(
        pool: &PgPool,
        partnership_id: DbId,
        since: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT date_trunc('month', c.contributed_on)::date AS month, SUM(c.amount) AS total
             FROM contributions c
             JOIN goals g ON g.id = c.goal_id
             WHERE g.partnership_id = $1 AND c.contributed_on >= $2
             GROUP BY 1
             ORDER BY 1",
        )
        .bind(partnership_id)
        .bind(since)
        .fetch_all(pool)
        .await
    }
}
