//! Repository for the `partnerships` table.

use splitsave_core::types::{DbId, UserId};
use sqlx::{PgConnection, PgPool};

use crate::models::partnership::{CreatePartnership, IncomeRecord, Partnership, UpdatePartnership};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, partner_a_id, partner_b_id, partner_a_income, \
                       partner_b_income, currency, created_at, updated_at";

/// Column list for `partnership_incomes` queries.
const INCOME_COLUMNS: &str =
    "id, partnership_id, partner_a_income, partner_b_income, effective_on, created_at, updated_at";

/// Append the partnership's current incomes to its income history.
async fn record_income(conn: &mut PgConnection, partnership: &Partnership) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO partnership_incomes (partnership_id, partner_a_income, partner_b_income)
         VALUES ($1, $2, $3)",
    )
    .bind(partnership.id)
    .bind(partnership.partner_a_income)
    .bind(partnership.partner_b_income)
    .execute(conn)
    .await?;
    Ok(())
}

/// Provides CRUD operations for partnerships.
pub struct PartnershipRepo;

impl PartnershipRepo {
    /// Insert a new partnership with `owner` as partner A, and open its
    /// income history with the starting incomes.
    ///
    /// Fails with a `uq_partnerships_partner_a` violation if `owner`
    /// already created one.
    pub async fn create(
        pool: &PgPool,
        owner: UserId,
        input: &CreatePartnership,
    ) -> Result<Partnership, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO partnerships (name, partner_a_id, partner_a_income, partner_b_income, currency)
             VALUES ($1, $2, COALESCE($3, 0), COALESCE($4, 0), COALESCE($5, 'USD'))
             RETURNING {COLUMNS}"
        );
        let partnership = sqlx::query_as::<_, Partnership>(&query)
            .bind(&input.name)
            .bind(owner)
            .bind(input.partner_a_income)
            .bind(input.partner_b_income)
            .bind(&input.currency)
            .fetch_one(&mut *tx)
            .await?;
        record_income(&mut tx, &partnership).await?;

        tx.commit().await?;
        Ok(partnership)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Partnership>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM partnerships WHERE id = $1");
        sqlx::query_as::<_, Partnership>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Partnerships the user belongs to on either side, oldest first.
    pub async fn list_for_user(pool: &PgPool, user_id: UserId) -> Result<Vec<Partnership>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM partnerships
             WHERE partner_a_id = $1 OR partner_b_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Partnership>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a partnership. Only non-`None` fields in `input` are applied.
    ///
    /// An income change is appended to the income history in the same
    /// transaction. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePartnership,
    ) -> Result<Option<Partnership>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE partnerships SET
                name = COALESCE($2, name),
                partner_a_income = COALESCE($3, partner_a_income),
                partner_b_income = COALESCE($4, partner_b_income),
                currency = COALESCE($5, currency)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let partnership = sqlx::query_as::<_, Partnership>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.partner_a_income)
            .bind(input.partner_b_income)
            .bind(&input.currency)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(partnership) = partnership else {
            tx.rollback().await?;
            return Ok(None);
        };
        if input.changes_income() {
            record_income(&mut tx, &partnership).await?;
        }

        tx.commit().await?;
        Ok(Some(partnership))
    }

    /// Income history, oldest first. Same-day changes keep insertion order.
    pub async fn income_history(pool: &PgPool, partnership_id: DbId) -> Result<Vec<IncomeRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {INCOME_COLUMNS} FROM partnership_incomes
             WHERE partnership_id = $1
             ORDER BY effective_on ASC, id ASC"
        );
        sqlx::query_as::<_, IncomeRecord>(&query)
            .bind(partnership_id)
            .fetch_all(pool)
            .await
    }

    /// Claim the partner B seat.
    ///
    /// Returns `None` when the seat is already taken or `user_id` is
    /// partner A.
    pub async fn join(
        pool: &PgPool,
        id: DbId,
        user_id: UserId,
    ) -> Result<Option<Partnership>, sqlx::Error> {
        let query = format!(
            "UPDATE partnerships SET partner_b_id = $2
             WHERE id = $1 AND partner_b_id IS NULL AND partner_a_id <> $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Partnership>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
