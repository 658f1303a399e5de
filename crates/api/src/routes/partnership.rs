//! Route definitions for the `/partnerships` resource.
//!
//! Everything scoped to one household is nested under
//! `/partnerships/{id}/...`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{
    achievement, activity, analytics, expense, goal, partnership, safety_pot,
};
use crate::state::AppState;

/// Routes mounted at `/partnerships`.
///
/// ```text
/// GET    /                                  -> list_mine
/// POST   /                                  -> create
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update
/// POST   /{id}/join                         -> join
///
/// GET    /{id}/goals                        -> goal::list
/// POST   /{id}/goals                        -> goal::create
/// GET    /{id}/goals/prioritization         -> goal::prioritization
/// GET    /{id}/goals/recommendations        -> goal::recommendations
///
/// GET    /{id}/expenses                     -> expense::list
/// POST   /{id}/expenses                     -> expense::create
/// GET    /{id}/expenses/split-preview       -> expense::split_preview
/// GET    /{id}/settlement                   -> expense::settlement
///
/// GET    /{id}/safety-pot                   -> safety_pot::get
/// PUT    /{id}/safety-pot                   -> safety_pot::update_target
/// POST   /{id}/safety-pot/deposit           -> safety_pot::deposit
/// POST   /{id}/safety-pot/withdraw          -> safety_pot::withdraw
///
/// GET    /{id}/analytics/dashboard          -> analytics::dashboard
/// GET    /{id}/analytics/health-score       -> analytics::health_score
/// GET    /{id}/analytics/forecast           -> analytics::forecast
/// GET    /{id}/analytics/behavior           -> analytics::behavior
///
/// GET    /{id}/achievements                 -> achievement::list
/// POST   /{id}/achievements/evaluate        -> achievement::evaluate
/// GET    /{id}/activity                     -> activity::list
/// ```
pub fn router() -> Router<AppState> {
    let goal_routes = Router::new()
        .route("/", get(goal::list).post(goal::create))
        .route("/prioritization", get(goal::prioritization))
        .route("/recommendations", get(goal::recommendations));

    let expense_routes = Router::new()
        .route("/", get(expense::list).post(expense::create))
        .route("/split-preview", get(expense::split_preview));

    let safety_pot_routes = Router::new()
        .route("/", get(safety_pot::get).put(safety_pot::update_target))
        .route("/deposit", post(safety_pot::deposit))
        .route("/withdraw", post(safety_pot::withdraw));

    let analytics_routes = Router::new()
        .route("/dashboard", get(analytics::dashboard))
        .route("/health-score", get(analytics::health_score))
        .route("/forecast", get(analytics::forecast))
        .route("/behavior", get(analytics::behavior));

    Router::new()
        .route("/", get(partnership::list_mine).post(partnership::create))
        .route("/{id}", get(partnership::get_by_id).put(partnership::update))
        .route("/{id}/join", post(partnership::join))
        .route("/{id}/settlement", get(expense::settlement))
        .route("/{id}/achievements", get(achievement::list))
        .route("/{id}/achievements/evaluate", post(achievement::evaluate))
        .route("/{id}/activity", get(activity::list))
        .nest("/{id}/goals", goal_routes)
        .nest("/{id}/expenses", expense_routes)
        .nest("/{id}/safety-pot", safety_pot_routes)
        .nest("/{id}/analytics", analytics_routes)
}
