//! Handlers for the partnership activity feed.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use splitsave_core::activity::ActivityType;
use splitsave_core::pagination::{clamp_limit, clamp_offset};
use splitsave_core::types::{DbId, Timestamp, UserId};
use splitsave_db::models::activity::{Activity, NewActivity};
use splitsave_db::repositories::ActivityRepo;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::handlers::access::find_partnership_for_member;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

/// Append an entry to the feed.
///
/// The feed is secondary to the mutation that produced it, so a failed
/// insert is logged and swallowed.
pub async fn record(
    pool: &PgPool,
    partnership_id: DbId,
    user_id: UserId,
    activity_type: ActivityType,
    entity_id: Option<DbId>,
    details: serde_json::Value,
) {
    let input = NewActivity {
        partnership_id,
        user_id,
        activity_type,
        entity_id,
        details: Some(details),
    };
    if let Err(e) = ActivityRepo::log(pool, &input).await {
        tracing::warn!(
            partnership_id,
            activity_type = activity_type.as_str(),
            error = %e,
            "Failed to record activity",
        );
    }
}

#[derive(Debug, Serialize)]
pub struct ActivityItem {
    pub id: DbId,
    pub user_id: UserId,
    pub activity_type: String,
    pub entity_type: String,
    pub entity_id: Option<DbId>,
    pub description: String,
    pub details: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

impl From<Activity> for ActivityItem {
    fn from(activity: Activity) -> Self {
        let description = activity.describe();
        Self {
            id: activity.id,
            user_id: activity.user_id,
            activity_type: activity.activity_type,
            entity_type: activity.entity_type,
            entity_id: activity.entity_id,
            description,
            details: activity.details,
            created_at: activity.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActivityPage {
    pub items: Vec<ActivityItem>,
    pub total: i64,
}

/// GET /api/v1/partnerships/{id}/activity
///
/// Newest first.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<ActivityPage>>> {
    find_partnership_for_member(&state.pool, partnership_id, &auth).await?;

    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);
    let rows = ActivityRepo::list_by_partnership(&state.pool, partnership_id, limit, offset).await?;
    let total = ActivityRepo::count_by_partnership(&state.pool, partnership_id).await?;

    Ok(Json(DataResponse {
        data: ActivityPage {
            items: rows.into_iter().map(ActivityItem::from).collect(),
            total,
        },
    }))
}
