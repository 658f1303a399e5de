//! Route definitions for the `/expenses` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::expense;
use crate::state::AppState;

/// Routes mounted at `/expenses`.
///
/// ```text
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        get(expense::get_by_id)
            .put(expense::update)
            .delete(expense::delete),
    )
}
