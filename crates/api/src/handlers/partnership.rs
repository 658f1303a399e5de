//! Handlers for the `/partnerships` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use splitsave_core::activity::ActivityType;
use splitsave_core::error::CoreError;
use splitsave_core::notifications;
use splitsave_core::types::DbId;
use splitsave_core::validation::{validate_currency, validate_name, validate_non_negative};
use splitsave_db::models::partnership::{CreatePartnership, Partnership, UpdatePartnership};
use splitsave_db::repositories::PartnershipRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::access::find_partnership_for_member;
use crate::handlers::activity::record;
use crate::handlers::notification::notify;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn validate_incomes(a: Option<f64>, b: Option<f64>) -> Result<(), CoreError> {
    if let Some(income) = a {
        validate_non_negative(income, "partner_a_income")?;
    }
    if let Some(income) = b {
        validate_non_negative(income, "partner_b_income")?;
    }
    Ok(())
}

fn already_partnered() -> AppError {
    AppError::Core(CoreError::Conflict(
        "You already belong to a partnership".to_string(),
    ))
}

/// POST /api/v1/partnerships
///
/// The caller becomes partner A. A user belongs to at most one partnership.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePartnership>,
) -> AppResult<(StatusCode, Json<Partnership>)> {
    validate_name(&input.name, "name")?;
    validate_incomes(input.partner_a_income, input.partner_b_income)?;
    if let Some(currency) = &input.currency {
        validate_currency(currency)?;
    }
    if !PartnershipRepo::list_for_user(&state.pool, auth.user_id).await?.is_empty() {
        return Err(already_partnered());
    }

    let partnership = PartnershipRepo::create(&state.pool, auth.user_id, &input).await?;

    tracing::info!(
        partnership_id = partnership.id,
        user_id = %auth.user_id,
        "Partnership created",
    );
    record(
        &state.pool,
        partnership.id,
        auth.user_id,
        ActivityType::PartnershipCreated,
        Some(partnership.id),
        json!({ "name": partnership.name }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(partnership)))
}

/// GET /api/v1/partnerships
pub async fn list_mine(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Partnership>>>> {
    let partnerships = PartnershipRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: partnerships }))
}

/// GET /api/v1/partnerships/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Partnership>> {
    let partnership = find_partnership_for_member(&state.pool, id, &auth).await?;
    Ok(Json(partnership))
}

/// PUT /api/v1/partnerships/{id}
///
/// Either partner may edit the name, currency and both incomes.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePartnership>,
) -> AppResult<Json<Partnership>> {
    if let Some(name) = &input.name {
        validate_name(name, "name")?;
    }
    validate_incomes(input.partner_a_income, input.partner_b_income)?;
    if let Some(currency) = &input.currency {
        validate_currency(currency)?;
    }
    find_partnership_for_member(&state.pool, id, &auth).await?;

    let partnership = PartnershipRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Partnership", id))?;

    tracing::info!(partnership_id = id, user_id = %auth.user_id, "Partnership updated");
    record(
        &state.pool,
        id,
        auth.user_id,
        ActivityType::PartnershipUpdated,
        Some(id),
        json!({
            "partner_a_income": partnership.partner_a_income,
            "partner_b_income": partnership.partner_b_income,
        }),
    )
    .await;

    Ok(Json(partnership))
}

/// POST /api/v1/partnerships/{id}/join
///
/// Claim the partner B seat.
pub async fn join(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Partnership>> {
    let existing = PartnershipRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Partnership", id))?;
    if existing.is_member(auth.user_id) {
        return Err(AppError::Core(CoreError::Conflict(
            "You are already a member of this partnership".to_string(),
        )));
    }
    if !PartnershipRepo::list_for_user(&state.pool, auth.user_id).await?.is_empty() {
        return Err(already_partnered());
    }

    let partnership = PartnershipRepo::join(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "This partnership already has two partners".to_string(),
            ))
        })?;

    tracing::info!(partnership_id = id, user_id = %auth.user_id, "Partner joined");
    record(
        &state.pool,
        id,
        auth.user_id,
        ActivityType::PartnerJoined,
        Some(id),
        json!({ "name": partnership.name }),
    )
    .await;
    notify(
        &state.pool,
        partnership.partner_a_id,
        &notifications::partner_joined(id, &partnership.name),
    )
    .await;

    Ok(Json(partnership))
}
