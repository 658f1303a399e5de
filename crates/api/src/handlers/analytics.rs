//! Read-only analytics over a partnership's history: the dashboard, the
//! health score, savings forecasts and contribution behavior.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use splitsave_core::behavior::BehaviorAnalysis;
use splitsave_core::expense_split::{category_breakdown, CategoryTotal, IncomeShares};
use splitsave_core::forecasting::{
    forecast_savings, project_goal_completion, validate_horizon, HealthScore, MonthlySnapshot,
    SavingsForecast, DEFAULT_FORECAST_MONTHS,
};
use splitsave_core::money::round_cents;
use splitsave_core::types::DbId;
use splitsave_core::validation::validate_positive;
use splitsave_db::models::partnership::Partnership;
use splitsave_db::models::safety_pot::SafetyPot;
use splitsave_db::repositories::ExpenseRepo;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::handlers::access::find_partnership_for_member;
use crate::handlers::snapshot::{history_start, today, PartnershipSnapshot};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    /// Horizon in months, 1 to 24. Defaults to 12.
    pub months: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct BehaviorQuery {
    pub monthly_target: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct GoalProjection {
    pub goal_id: DbId,
    pub name: String,
    pub remaining: f64,
    pub target_date: Option<NaiveDate>,
    /// This goal's own average monthly contribution over the history window.
    pub monthly_pace: f64,
    /// `None` while nothing is being saved toward this goal.
    pub projected_completion: Option<NaiveDate>,
    pub on_schedule: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ForecastReport {
    pub savings: SavingsForecast,
    pub goals: Vec<GoalProjection>,
}

#[derive(Debug, Serialize)]
pub struct GoalTotals {
    /// Not yet completed.
    pub open: usize,
    /// Open, underfunded and with a deadline still ahead.
    pub active: usize,
    pub completed: usize,
    pub total_saved: f64,
    pub total_target: f64,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub partnership_id: DbId,
    pub monthly_income: f64,
    pub shares: IncomeShares,
    pub history: Vec<MonthlySnapshot>,
    pub categories: Vec<CategoryTotal>,
    pub goals: GoalTotals,
    pub safety_pot: SafetyPot,
    pub health: HealthScore,
    pub forecast: ForecastReport,
    pub behavior: BehaviorAnalysis,
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

fn forecast_report(snapshot: &PartnershipSnapshot, horizon: u32, today: NaiveDate) -> ForecastReport {
    let total_saved: f64 = snapshot.goals.iter().map(|g| g.current_amount).sum();

    let goals = snapshot
        .goals
        .iter()
        .filter(|g| g.completed_at.is_none())
        .map(|g| {
            let snap = g.snapshot();
            let pace = snapshot.goal_monthly_pace(g.id);
            let projected = project_goal_completion(snap.remaining(), pace, today);
            GoalProjection {
                goal_id: g.id,
                name: g.name.clone(),
                remaining: round_cents(snap.remaining()),
                target_date: g.target_date,
                monthly_pace: round_cents(pace),
                projected_completion: projected,
                on_schedule: g.target_date.map(|due| projected.is_some_and(|p| p <= due)),
            }
        })
        .collect();

    ForecastReport {
        savings: forecast_savings(&snapshot.history, round_cents(total_saved), horizon, today),
        goals,
    }
}

async fn load_for_member(
    pool: &PgPool,
    partnership_id: DbId,
    auth: &AuthUser,
    today: NaiveDate,
) -> AppResult<(Partnership, PartnershipSnapshot)> {
    let partnership = find_partnership_for_member(pool, partnership_id, auth).await?;
    let snapshot = PartnershipSnapshot::load(pool, &partnership, today).await?;
    Ok((partnership, snapshot))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/partnerships/{id}/analytics/dashboard
pub async fn dashboard(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Dashboard>>> {
    let today = today();
    let (partnership, snapshot) = load_for_member(&state.pool, partnership_id, &auth, today).await?;

    let expenses = ExpenseRepo::list_since(
        &state.pool,
        partnership_id,
        Some(history_start(&partnership, today)),
    )
    .await?;
    let categories = category_breakdown(expenses.iter().map(|e| (e.category.as_str(), e.amount)));

    let goals = GoalTotals {
        open: snapshot.goals.iter().filter(|g| g.completed_at.is_none()).count(),
        active: snapshot.goals.iter().filter(|g| g.snapshot().is_active(today)).count(),
        completed: snapshot.goals.iter().filter(|g| g.completed_at.is_some()).count(),
        total_saved: round_cents(snapshot.goals.iter().map(|g| g.current_amount).sum()),
        total_target: round_cents(snapshot.goals.iter().map(|g| g.target_amount).sum()),
    };

    let health = snapshot.health_score(today);
    let forecast = forecast_report(&snapshot, DEFAULT_FORECAST_MONTHS, today);
    let behavior = snapshot.behavior(None);

    Ok(Json(DataResponse {
        data: Dashboard {
            partnership_id,
            monthly_income: snapshot.monthly_income,
            shares: partnership.income_shares(),
            categories,
            goals,
            health,
            forecast,
            behavior,
            history: snapshot.history,
            safety_pot: snapshot.safety_pot,
        },
    }))
}

/// GET /api/v1/partnerships/{id}/analytics/health-score
pub async fn health_score(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
) -> AppResult<Json<DataResponse<HealthScore>>> {
    let today = today();
    let (_, snapshot) = load_for_member(&state.pool, partnership_id, &auth, today).await?;
    Ok(Json(DataResponse {
        data: snapshot.health_score(today),
    }))
}

/// GET /api/v1/partnerships/{id}/analytics/forecast?months=
pub async fn forecast(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
    Query(params): Query<ForecastQuery>,
) -> AppResult<Json<DataResponse<ForecastReport>>> {
    let horizon = validate_horizon(params.months)?;
    let today = today();
    let (_, snapshot) = load_for_member(&state.pool, partnership_id, &auth, today).await?;
    Ok(Json(DataResponse {
        data: forecast_report(&snapshot, horizon, today),
    }))
}

/// GET /api/v1/partnerships/{id}/analytics/behavior?monthly_target=
pub async fn behavior(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
    Query(params): Query<BehaviorQuery>,
) -> AppResult<Json<DataResponse<BehaviorAnalysis>>> {
    if let Some(target) = params.monthly_target {
        validate_positive(target, "monthly_target")?;
    }
    let (_, snapshot) = load_for_member(&state.pool, partnership_id, &auth, today()).await?;
    Ok(Json(DataResponse {
        data: snapshot.behavior(params.monthly_target),
    }))
}
