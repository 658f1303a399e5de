pub mod expense;
pub mod goal;
pub mod health;
pub mod notification;
pub mod partnership;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree. Every route requires a bearer token.
///
/// ```text
/// /partnerships                                  create, list mine
/// /partnerships/{id}                             get, update
/// /partnerships/{id}/join                        claim the partner B seat
/// /partnerships/{id}/goals                       list, create
/// /partnerships/{id}/goals/prioritization        weighted allocation
/// /partnerships/{id}/goals/recommendations       plan adjustments
/// /partnerships/{id}/expenses                    list, create
/// /partnerships/{id}/expenses/split-preview      split an amount by income
/// /partnerships/{id}/settlement                  who owes whom
/// /partnerships/{id}/safety-pot                  get, set target
/// /partnerships/{id}/safety-pot/deposit          add funds
/// /partnerships/{id}/safety-pot/withdraw         remove funds
/// /partnerships/{id}/analytics/*                 dashboard, health-score, forecast, behavior
/// /partnerships/{id}/achievements                catalog with unlock state
/// /partnerships/{id}/achievements/evaluate       unlock newly earned
/// /partnerships/{id}/activity                    feed
///
/// /goals/{id}                                    get, update, delete
/// /goals/{id}/contributions                      list, create
///
/// /expenses/{id}                                 get, update, delete
///
/// /notifications                                 inbox
/// /notifications/unread-count                    badge count
/// /notifications/read-all                        mark all read
/// /notifications/{id}/read                       mark one read
/// /notifications/deadline-check                  create due-date reminders
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/partnerships", partnership::router())
        .nest("/goals", goal::router())
        .nest("/expenses", expense::router())
        .nest("/notifications", notification::router())
}
