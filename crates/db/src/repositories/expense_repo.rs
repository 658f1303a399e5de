//! Repository for the `expenses` table.

use chrono::NaiveDate;
use splitsave_core::types::{DbId, UserId};
use sqlx::PgPool;

use crate::models::expense::{CreateExpense, Expense, ExpenseFilter, UpdateExpense};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, partnership_id, paid_by, description, amount, category, \
                       expense_date, is_shared, created_at, updated_at";

/// Default page size for expense listing.
pub const DEFAULT_LIMIT: i64 = 50;
/// Maximum page size for expense listing.
pub const MAX_LIMIT: i64 = 200;

/// Provides CRUD and aggregate queries for expenses.
pub struct ExpenseRepo;

impl ExpenseRepo {
    /// Insert an expense paid by `paid_by`.
    pub async fn create(
        pool: &PgPool,
        partnership_id: DbId,
        paid_by: UserId,
        input: &CreateExpense,
    ) -> Result<Expense, sqlx::Error> {
        let query = format!(
            "INSERT INTO expenses
                (partnership_id, paid_by, description, amount, category, expense_date, is_shared)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'general'), COALESCE($6, CURRENT_DATE), COALESCE($7, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Expense>(&query)
            .bind(partnership_id)
            .bind(paid_by)
            .bind(&input.description)
            .bind(input.amount)
            .bind(&input.category)
            .bind(input.expense_date)
            .bind(input.is_shared)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Expense>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM expenses WHERE id = $1");
        sqlx::query_as::<_, Expense>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List expenses newest first, filtered by date range and category.
    ///
    /// `limit` and `offset` must already be clamped by the caller.
    pub async fn list_by_partnership(
        pool: &PgPool,
        partnership_id: DbId,
        filter: &ExpenseFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Expense>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM expenses
             WHERE partnership_id = $1
               AND ($2::date IS NULL OR expense_date >= $2)
               AND ($3::date IS NULL OR expense_date <= $3)
               AND ($4::text IS NULL OR category = $4)
             ORDER BY expense_date DESC, id DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Expense>(&query)
            .bind(partnership_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(&filter.category)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every expense dated on or after `since` (all of them when `None`),
    /// oldest first.
    pub async fn list_since(
        pool: &PgPool,
        partnership_id: DbId,
        since: Option<NaiveDate>,
    ) -> Result<Vec<Expense>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM expenses
             WHERE partnership_id = $1 AND ($2::date IS NULL OR expense_date >= $2)
             ORDER BY expense_date ASC, id ASC"
        );
        sqlx::query_as::<_, Expense>(&query)
            .bind(partnership_id)
            .bind(since)
            .fetch_all(pool)
            .await
    }

    /// Update an expense. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateExpense,
    ) -> Result<Option<Expense>, sqlx::Error> {
        let query = format!(
            "UPDATE expenses SET
                description = COALESCE($2, description),
                amount = COALESCE($3, amount),
                category = COALESCE($4, category),
                expense_date = COALESCE($5, expense_date),
                is_shared = COALESCE($6, is_shared),
                paid_by = COALESCE($7, paid_by)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Expense>(&query)
            .bind(id)
            .bind(&input.description)
            .bind(input.amount)
            .bind(&input.category)
            .bind(input.expense_date)
            .bind(input.is_shared)
            .bind(input.paid_by)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete an expense. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool, partnership_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM expenses WHERE partnership_id = $1")
            .bind(partnership_id)
            .fetch_one(pool)
            .await
    }

    /// Total spend per calendar month from `since`, keyed by the first of the month.
    pub async fn monthly_totals(
        pool: &PgPool,
        partnership_id: DbId,
        since: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT date_trunc('month', expense_date)::date AS month, SUM(amount) AS total
             FROM expenses
             WHERE partnership_id = $1 AND expense_date >= $2
             GROUP BY 1
             ORDER BY 1",
        )
        .bind(partnership_id)
        .bind(since)
        .fetch_all(pool)
        .await
    }
}
