//! Handlers for goal contributions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use splitsave_core::activity::ActivityType;
use splitsave_core::error::CoreError;
use splitsave_core::pagination::{clamp_limit, clamp_offset};
use splitsave_core::types::DbId;
use splitsave_core::validation::validate_positive;
use splitsave_db::models::contribution::{Contribution, CreateContribution, RecordedContribution};
use splitsave_db::repositories::ContributionRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::access::find_goal_for_member;
use crate::handlers::achievement::evaluate_quietly;
use crate::handlers::activity::record;
use crate::handlers::goal::announce_if_completed;
use crate::handlers::snapshot::today;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

/// GET /api/v1/goals/{id}/contributions
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(goal_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Contribution>>>> {
    find_goal_for_member(&state.pool, goal_id, &auth).await?;
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);
    let contributions = ContributionRepo::list_by_goal(&state.pool, goal_id, limit, offset).await?;
    Ok(Json(DataResponse {
        data: contributions,
    }))
}

/// POST /api/v1/goals/{id}/contributions
///
/// Credits the goal and returns both the contribution and the updated goal.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(goal_id): Path<DbId>,
    Json(input): Json<CreateContribution>,
) -> AppResult<(StatusCode, Json<RecordedContribution>)> {
    validate_positive(input.amount, "amount")?;
    if let Some(date) = input.contributed_on {
        if date > today() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "contributed_on cannot be in the future, got {date}"
            ))));
        }
    }
    let (before, partnership) = find_goal_for_member(&state.pool, goal_id, &auth).await?;

    let recorded = ContributionRepo::create(&state.pool, goal_id, auth.user_id, &input)
        .await?
        .ok_or(AppError::not_found("Goal", goal_id))?;

    tracing::info!(
        contribution_id = recorded.contribution.id,
        goal_id,
        amount = recorded.contribution.amount,
        user_id = %auth.user_id,
        "Contribution recorded",
    );
    record(
        &state.pool,
        partnership.id,
        auth.user_id,
        ActivityType::ContributionAdded,
        Some(recorded.contribution.id),
        json!({
            "amount": recorded.contribution.amount,
            "goal_id": goal_id,
            "goal_name": recorded.goal.name,
        }),
    )
    .await;
    announce_if_completed(&state.pool, &partnership, &before, &recorded.goal, auth.user_id).await;
    evaluate_quietly(&state.pool, &partnership, auth.user_id).await;

    Ok((StatusCode::CREATED, Json(recorded)))
}
