//! Membership checks shared by every partnership-scoped handler.
//!
//! A caller who is not partner A or B gets the same 404 as for a missing
//! row, so ids of other households are not disclosed.

use splitsave_core::types::DbId;
use splitsave_db::models::expense::Expense;
use splitsave_db::models::goal::Goal;
use splitsave_db::models::partnership::Partnership;
use splitsave_db::repositories::{ExpenseRepo, GoalRepo, PartnershipRepo};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// Load a partnership the caller belongs to.
pub async fn find_partnership_for_member(
    pool: &PgPool,
    partnership_id: DbId,
    auth: &AuthUser,
) -> AppResult<Partnership> {
    PartnershipRepo::find_by_id(pool, partnership_id)
        .await?
        .filter(|p| p.is_member(auth.user_id))
        .ok_or(AppError::not_found("Partnership", partnership_id))
}

/// Load a live goal and its partnership, checking membership.
pub async fn find_goal_for_member(
    pool: &PgPool,
    goal_id: DbId,
    auth: &AuthUser,
) -> AppResult<(Goal, Partnership)> {
    let goal = GoalRepo::find_by_id(pool, goal_id)
        .await?
        .ok_or(AppError::not_found("Goal", goal_id))?;
    let partnership = PartnershipRepo::find_by_id(pool, goal.partnership_id)
        .await?
        .filter(|p| p.is_member(auth.user_id))
        .ok_or(AppError::not_found("Goal", goal_id))?;
    Ok((goal, partnership))
}

/// Load an expense and its partnership, checking membership.
pub async fn find_expense_for_member(
    pool: &PgPool,
    expense_id: DbId,
    auth: &AuthUser,
) -> AppResult<(Expense, Partnership)> {
    let expense = ExpenseRepo::find_by_id(pool, expense_id)
        .await?
        .ok_or(AppError::not_found("Expense", expense_id))?;
    let partnership = PartnershipRepo::find_by_id(pool, expense.partnership_id)
        .await?
        .filter(|p| p.is_member(auth.user_id))
        .ok_or(AppError::not_found("Expense", expense_id))?;
    Ok((expense, partnership))
}
