//! Expense entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use splitsave_core::types::{DbId, Timestamp, UserId};
use sqlx::FromRow;

/// A row from the `expenses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Expense {
    pub id: DbId,
    pub partnership_id: DbId,
    pub paid_by: UserId,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub expense_date: NaiveDate,
    pub is_shared: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording an expense.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateExpense {
    pub description: String,
    pub amount: f64,
    /// Defaults to `general`.
    pub category: Option<String>,
    /// Defaults to today.
    pub expense_date: Option<NaiveDate>,
    /// Defaults to `true`.
    pub is_shared: Option<bool>,
    /// Defaults to the caller. Must be one of the two partners.
    pub paid_by: Option<UserId>,
}

/// DTO for updating an expense. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateExpense {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub expense_date: Option<NaiveDate>,
    pub is_shared: Option<bool>,
    pub paid_by: Option<UserId>,
}

/// Filters for listing a partnership's expenses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
