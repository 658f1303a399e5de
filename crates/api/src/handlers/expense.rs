//! Handlers for shared expenses, split previews and settlement.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use splitsave_core::activity::ActivityType;
use splitsave_core::error::CoreError;
use splitsave_core::expense_split::{
    settle, split_expense, IncomeShares, Settlement, SettlementItem, SplitAmounts,
};
use splitsave_core::notifications;
use splitsave_core::pagination::{clamp_limit, clamp_offset};
use splitsave_core::types::{DbId, UserId};
use splitsave_core::validation::{validate_name, validate_positive};
use splitsave_db::models::expense::{CreateExpense, Expense, ExpenseFilter, UpdateExpense};
use splitsave_db::models::partnership::Partnership;
use splitsave_db::repositories::expense_repo::{DEFAULT_LIMIT, MAX_LIMIT};
use splitsave_db::repositories::ExpenseRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::access::{find_expense_for_member, find_partnership_for_member};
use crate::handlers::achievement::evaluate_quietly;
use crate::handlers::activity::record;
use crate::handlers::notification::notify;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SplitPreviewQuery {
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct SettlementQuery {
    /// Only expenses on or after this date. All expenses when omitted.
    pub since: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct SplitPreview {
    pub amount: f64,
    pub shares: IncomeShares,
    pub split: SplitAmounts,
}

#[derive(Debug, Serialize)]
pub struct SettlementSummary {
    #[serde(flatten)]
    pub settlement: Settlement,
    pub since: Option<NaiveDate>,
    pub debtor_id: Option<UserId>,
    pub creditor_id: Option<UserId>,
}

fn ensure_member(partnership: &Partnership, user_id: UserId) -> Result<(), CoreError> {
    if partnership.is_member(user_id) {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "paid_by must be one of the partners".to_string(),
        ))
    }
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/partnerships/{id}/expenses
///
/// Filters: `from`, `to`, `category`, plus `limit`/`offset`.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
    Query(filter): Query<ExpenseFilter>,
) -> AppResult<Json<DataResponse<Vec<Expense>>>> {
    find_partnership_for_member(&state.pool, partnership_id, &auth).await?;
    let limit = clamp_limit(filter.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(filter.offset);
    let expenses =
        ExpenseRepo::list_by_partnership(&state.pool, partnership_id, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: expenses }))
}

/// POST /api/v1/partnerships/{id}/expenses
///
/// `paid_by` defaults to the caller. When a shared expense is added the
/// other partner is told their share.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
    Json(input): Json<CreateExpense>,
) -> AppResult<(StatusCode, Json<Expense>)> {
    validate_name(&input.description, "description")?;
    validate_positive(input.amount, "amount")?;
    if let Some(category) = &input.category {
        validate_name(category, "category")?;
    }
    let partnership = find_partnership_for_member(&state.pool, partnership_id, &auth).await?;
    let paid_by = input.paid_by.unwrap_or(auth.user_id);
    ensure_member(&partnership, paid_by)?;

    let expense = ExpenseRepo::create(&state.pool, partnership_id, paid_by, &input).await?;

    tracing::info!(
        expense_id = expense.id,
        partnership_id,
        amount = expense.amount,
        user_id = %auth.user_id,
        "Expense added",
    );
    record(
        &state.pool,
        partnership_id,
        auth.user_id,
        ActivityType::ExpenseAdded,
        Some(expense.id),
        json!({
            "description": expense.description,
            "amount": expense.amount,
            "category": expense.category,
        }),
    )
    .await;

    if expense.is_shared {
        if let Some(other) = partnership.other_partner(auth.user_id) {
            let share = partnership
                .side_of(other)
                .map(|side| split_expense(expense.amount, partnership.income_shares()).of(side))
                .unwrap_or_default();
            let draft =
                notifications::partner_expense(expense.id, &expense.description, expense.amount, share);
            notify(&state.pool, other, &draft).await;
        }
    }
    evaluate_quietly(&state.pool, &partnership, auth.user_id).await;

    Ok((StatusCode::CREATED, Json(expense)))
}

/// GET /api/v1/expenses/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Expense>> {
    let (expense, _) = find_expense_for_member(&state.pool, id, &auth).await?;
    Ok(Json(expense))
}

/// PUT /api/v1/expenses/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateExpense>,
) -> AppResult<Json<Expense>> {
    if let Some(description) = &input.description {
        validate_name(description, "description")?;
    }
    if let Some(amount) = input.amount {
        validate_positive(amount, "amount")?;
    }
    if let Some(category) = &input.category {
        validate_name(category, "category")?;
    }
    let (_, partnership) = find_expense_for_member(&state.pool, id, &auth).await?;
    if let Some(paid_by) = input.paid_by {
        ensure_member(&partnership, paid_by)?;
    }

    let expense = ExpenseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Expense", id))?;

    tracing::info!(expense_id = id, user_id = %auth.user_id, "Expense updated");
    record(
        &state.pool,
        partnership.id,
        auth.user_id,
        ActivityType::ExpenseUpdated,
        Some(id),
        json!({ "description": expense.description, "amount": expense.amount }),
    )
    .await;

    Ok(Json(expense))
}

/// DELETE /api/v1/expenses/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let (expense, partnership) = find_expense_for_member(&state.pool, id, &auth).await?;

    if !ExpenseRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Expense", id));
    }

    tracing::info!(expense_id = id, user_id = %auth.user_id, "Expense deleted");
    record(
        &state.pool,
        partnership.id,
        auth.user_id,
        ActivityType::ExpenseDeleted,
        Some(id),
        json!({ "description": expense.description, "amount": expense.amount }),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Splitting
// ---------------------------------------------------------------------------

/// GET /api/v1/partnerships/{id}/expenses/split-preview?amount=
pub async fn split_preview(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
    Query(params): Query<SplitPreviewQuery>,
) -> AppResult<Json<DataResponse<SplitPreview>>> {
    validate_positive(params.amount, "amount")?;
    let partnership = find_partnership_for_member(&state.pool, partnership_id, &auth).await?;
    let shares = partnership.income_shares();

    Ok(Json(DataResponse {
        data: SplitPreview {
            amount: params.amount,
            shares,
            split: split_expense(params.amount, shares),
        },
    }))
}

/// GET /api/v1/partnerships/{id}/settlement
///
/// Net balance over shared expenses at the current income split. Expenses
/// paid by someone no longer in the partnership are left out.
pub async fn settlement(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
    Query(params): Query<SettlementQuery>,
) -> AppResult<Json<DataResponse<SettlementSummary>>> {
    let partnership = find_partnership_for_member(&state.pool, partnership_id, &auth).await?;
    let expenses = ExpenseRepo::list_since(&state.pool, partnership_id, params.since).await?;

    let items: Vec<SettlementItem> = expenses
        .iter()
        .filter_map(|e| {
            Some(SettlementItem {
                amount: e.amount,
                paid_by: partnership.side_of(e.paid_by)?,
                is_shared: e.is_shared,
            })
        })
        .collect();
    let settlement = settle(&items, partnership.income_shares());

    let debtor_id = settlement.debtor.and_then(|side| partnership.partner_id(side));
    let creditor_id = settlement
        .debtor
        .and_then(|side| partnership.partner_id(side.other()));

    Ok(Json(DataResponse {
        data: SettlementSummary {
            settlement,
            since: params.since,
            debtor_id,
            creditor_id,
        },
    }))
}
