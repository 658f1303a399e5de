//! Route definitions for the `/goals` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{contribution, goal};
use crate::state::AppState;

/// Routes mounted at `/goals`.
///
/// ```text
/// GET    /{id}                    -> get_by_id
/// PUT    /{id}                    -> update
/// DELETE /{id}                    -> delete
/// GET    /{id}/contributions      -> contribution::list
/// POST   /{id}/contributions      -> contribution::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(goal::get_by_id).put(goal::update).delete(goal::delete),
        )
        .route(
            "/{id}/contributions",
            get(contribution::list).post(contribution::create),
        )
}
