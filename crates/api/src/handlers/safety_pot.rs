//! Handlers for the partnership safety pot (emergency fund).

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use splitsave_core::activity::ActivityType;
use splitsave_core::error::CoreError;
use splitsave_core::forecasting::HealthInputs;
use splitsave_core::safety_pot::{self, progress_percent, PotMovement};
use splitsave_core::types::DbId;
use splitsave_core::validation::validate_positive;
use splitsave_db::models::safety_pot::{PotMovementRequest, SafetyPot, UpdateSafetyPot};
use splitsave_db::repositories::SafetyPotRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::access::find_partnership_for_member;
use crate::handlers::achievement::evaluate_quietly;
use crate::handlers::activity::record;
use crate::handlers::snapshot::{today, PartnershipSnapshot};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SafetyPotView {
    #[serde(flatten)]
    pub pot: SafetyPot,
    /// 0-100, absent without a target.
    pub progress_percent: Option<f64>,
    /// Months of average spending the balance covers.
    pub coverage_months: Option<f64>,
}

/// GET /api/v1/partnerships/{id}/safety-pot
///
/// The pot is created empty on first access.
pub async fn get(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
) -> AppResult<Json<DataResponse<SafetyPotView>>> {
    let partnership = find_partnership_for_member(&state.pool, partnership_id, &auth).await?;
    let snapshot = PartnershipSnapshot::load(&state.pool, &partnership, today()).await?;
    let pot = snapshot.safety_pot;
    let coverage_months =
        HealthInputs::from_history(&snapshot.history, pot.balance, None).emergency_coverage_months();

    Ok(Json(DataResponse {
        data: SafetyPotView {
            progress_percent: progress_percent(pot.balance, pot.target_amount),
            coverage_months,
            pot,
        },
    }))
}

/// PUT /api/v1/partnerships/{id}/safety-pot
///
/// Set the target, or clear it with `null`.
pub async fn update_target(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
    Json(input): Json<UpdateSafetyPot>,
) -> AppResult<Json<SafetyPot>> {
    if let Some(target) = input.target_amount {
        validate_positive(target, "target_amount")?;
    }
    let partnership = find_partnership_for_member(&state.pool, partnership_id, &auth).await?;
    SafetyPotRepo::get_or_create(&state.pool, partnership_id).await?;

    let pot = SafetyPotRepo::set_target(&state.pool, partnership_id, input.target_amount)
        .await?
        .ok_or(AppError::not_found("SafetyPot", partnership_id))?;

    tracing::info!(
        partnership_id,
        target_amount = ?pot.target_amount,
        user_id = %auth.user_id,
        "Safety pot target set",
    );
    evaluate_quietly(&state.pool, &partnership, auth.user_id).await;

    Ok(Json(pot))
}

/// POST /api/v1/partnerships/{id}/safety-pot/deposit
pub async fn deposit(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
    Json(input): Json<PotMovementRequest>,
) -> AppResult<Json<SafetyPot>> {
    move_funds(auth, state, partnership_id, PotMovement::Deposit, input).await
}

/// POST /api/v1/partnerships/{id}/safety-pot/withdraw
pub async fn withdraw(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
    Json(input): Json<PotMovementRequest>,
) -> AppResult<Json<SafetyPot>> {
    move_funds(auth, state, partnership_id, PotMovement::Withdrawal, input).await
}

async fn move_funds(
    auth: AuthUser,
    state: AppState,
    partnership_id: DbId,
    movement: PotMovement,
    input: PotMovementRequest,
) -> AppResult<Json<SafetyPot>> {
    let partnership = find_partnership_for_member(&state.pool, partnership_id, &auth).await?;
    let current = SafetyPotRepo::get_or_create(&state.pool, partnership_id).await?;
    safety_pot::apply(movement, current.balance, input.amount)?;

    // The guarded update catches a withdrawal racing another one.
    let pot = SafetyPotRepo::adjust_balance(&state.pool, partnership_id, movement.signed(input.amount))
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "Insufficient safety pot balance".to_string(),
            ))
        })?;

    let activity_type = match movement {
        PotMovement::Deposit => ActivityType::SafetyPotDeposit,
        PotMovement::Withdrawal => ActivityType::SafetyPotWithdrawal,
    };
    tracing::info!(
        partnership_id,
        amount = input.amount,
        balance = pot.balance,
        movement = activity_type.as_str(),
        user_id = %auth.user_id,
        "Safety pot balance changed",
    );
    record(
        &state.pool,
        partnership_id,
        auth.user_id,
        activity_type,
        Some(pot.id),
        json!({ "amount": input.amount, "balance": pot.balance, "note": input.note }),
    )
    .await;
    if movement == PotMovement::Deposit {
        evaluate_quietly(&state.pool, &partnership, auth.user_id).await;
    }

    Ok(Json(pot))
}
