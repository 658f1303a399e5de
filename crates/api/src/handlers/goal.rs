//! Handlers for savings goals and the prioritization engine.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use splitsave_core::activity::ActivityType;
use splitsave_core::error::CoreError;
use splitsave_core::goal_prioritization::{
    allocate, generate_recommendations, max_affordable, GoalAllocation, GoalRecommendation,
    GoalSnapshot,
};
use splitsave_core::notifications;
use splitsave_core::types::{DbId, UserId};
use splitsave_core::validation::{validate_name, validate_non_negative, validate_positive};
use splitsave_db::models::goal::{CreateGoal, Goal, UpdateGoal};
use splitsave_db::models::partnership::Partnership;
use splitsave_db::repositories::GoalRepo;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::handlers::access::{find_goal_for_member, find_partnership_for_member};
use crate::handlers::achievement::evaluate_quietly;
use crate::handlers::activity::record;
use crate::handlers::notification::notify_members;
use crate::handlers::snapshot::today;
use crate::middleware::auth::AuthUser;
use crate::query::IncomeParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PrioritizationReport {
    pub monthly_income: f64,
    /// Share of income available for goals.
    pub max_affordable: f64,
    pub allocations: Vec<GoalAllocation>,
}

/// Resolve the income the engine runs against.
fn monthly_income(params: &IncomeParams, partnership: &Partnership) -> Result<f64, CoreError> {
    match params.monthly_income {
        Some(income) => {
            validate_non_negative(income, "monthly_income")?;
            Ok(income)
        }
        None => Ok(partnership.combined_income()),
    }
}

/// Log and announce a goal that just became fully funded.
pub async fn announce_if_completed(
    pool: &PgPool,
    partnership: &Partnership,
    before: &Goal,
    after: &Goal,
    user_id: UserId,
) {
    if before.completed_at.is_some() || after.completed_at.is_none() {
        return;
    }
    tracing::info!(goal_id = after.id, user_id = %user_id, "Goal completed");
    record(
        pool,
        partnership.id,
        user_id,
        ActivityType::GoalCompleted,
        Some(after.id),
        json!({ "name": after.name, "target_amount": after.target_amount }),
    )
    .await;
    notify_members(
        pool,
        partnership,
        &notifications::goal_reached(after.id, &after.name, after.target_amount),
    )
    .await;
}

/// GET /api/v1/partnerships/{id}/goals
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Goal>>>> {
    find_partnership_for_member(&state.pool, partnership_id, &auth).await?;
    let goals = GoalRepo::list_by_partnership(&state.pool, partnership_id).await?;
    Ok(Json(DataResponse { data: goals }))
}

/// POST /api/v1/partnerships/{id}/goals
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
    Json(input): Json<CreateGoal>,
) -> AppResult<(StatusCode, Json<Goal>)> {
    validate_name(&input.name, "name")?;
    validate_positive(input.target_amount, "target_amount")?;
    if let Some(current) = input.current_amount {
        validate_non_negative(current, "current_amount")?;
    }
    if let Some(category) = &input.category {
        validate_name(category, "category")?;
    }
    let partnership = find_partnership_for_member(&state.pool, partnership_id, &auth).await?;

    let goal = GoalRepo::create(&state.pool, partnership_id, &input).await?;

    tracing::info!(goal_id = goal.id, partnership_id, user_id = %auth.user_id, "Goal created");
    record(
        &state.pool,
        partnership_id,
        auth.user_id,
        ActivityType::GoalCreated,
        Some(goal.id),
        json!({ "name": goal.name, "target_amount": goal.target_amount }),
    )
    .await;
    evaluate_quietly(&state.pool, &partnership, auth.user_id).await;

    Ok((StatusCode::CREATED, Json(goal)))
}

/// GET /api/v1/goals/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Goal>> {
    let (goal, _) = find_goal_for_member(&state.pool, id, &auth).await?;
    Ok(Json(goal))
}

/// PUT /api/v1/goals/{id}
///
/// Lowering the target to the saved amount completes the goal, raising it
/// reopens it.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateGoal>,
) -> AppResult<Json<Goal>> {
    if let Some(name) = &input.name {
        validate_name(name, "name")?;
    }
    if let Some(target) = input.target_amount {
        validate_positive(target, "target_amount")?;
    }
    if let Some(category) = &input.category {
        validate_name(category, "category")?;
    }
    let (before, partnership) = find_goal_for_member(&state.pool, id, &auth).await?;

    let goal = GoalRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Goal", id))?;

    tracing::info!(goal_id = id, user_id = %auth.user_id, "Goal updated");
    record(
        &state.pool,
        partnership.id,
        auth.user_id,
        ActivityType::GoalUpdated,
        Some(id),
        json!({ "name": goal.name }),
    )
    .await;
    announce_if_completed(&state.pool, &partnership, &before, &goal, auth.user_id).await;
    evaluate_quietly(&state.pool, &partnership, auth.user_id).await;

    Ok(Json(goal))
}

/// DELETE /api/v1/goals/{id}
///
/// Soft delete. Contributions are kept.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let (goal, partnership) = find_goal_for_member(&state.pool, id, &auth).await?;

    if !GoalRepo::soft_delete(&state.pool, id).await? {
        return Err(AppError::not_found("Goal", id));
    }

    tracing::info!(goal_id = id, user_id = %auth.user_id, "Goal deleted");
    record(
        &state.pool,
        partnership.id,
        auth.user_id,
        ActivityType::GoalDeleted,
        Some(id),
        json!({ "name": goal.name }),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/partnerships/{id}/goals/prioritization
///
/// Weighted allocation across the partnership's active goals.
pub async fn prioritization(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
    Query(params): Query<IncomeParams>,
) -> AppResult<Json<DataResponse<PrioritizationReport>>> {
    let partnership = find_partnership_for_member(&state.pool, partnership_id, &auth).await?;
    let income = monthly_income(&params, &partnership)?;
    let goals: Vec<GoalSnapshot> = GoalRepo::list_by_partnership(&state.pool, partnership_id)
        .await?
        .iter()
        .map(Goal::snapshot)
        .collect();

    Ok(Json(DataResponse {
        data: PrioritizationReport {
            monthly_income: income,
            max_affordable: max_affordable(income),
            allocations: allocate(&goals, income, today()),
        },
    }))
}

/// GET /api/v1/partnerships/{id}/goals/recommendations
pub async fn recommendations(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
    Query(params): Query<IncomeParams>,
) -> AppResult<Json<DataResponse<Vec<GoalRecommendation>>>> {
    let partnership = find_partnership_for_member(&state.pool, partnership_id, &auth).await?;
    let income = monthly_income(&params, &partnership)?;
    let goals: Vec<GoalSnapshot> = GoalRepo::list_by_partnership(&state.pool, partnership_id)
        .await?
        .iter()
        .map(Goal::snapshot)
        .collect();

    Ok(Json(DataResponse {
        data: generate_recommendations(&goals, income, today()),
    }))
}
