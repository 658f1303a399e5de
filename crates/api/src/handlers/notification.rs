//! Handlers for the `/notifications` resource.
//!
//! All endpoints require authentication via [`AuthUser`] and only ever
//! touch the caller's own inbox.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use splitsave_core::error::CoreError;
use splitsave_core::notifications::{
    deadline_reminders, NotificationDraft, DEFAULT_REMINDER_WINDOW_DAYS, MAX_REMINDER_WINDOW_DAYS,
};
use splitsave_core::pagination::{clamp_limit, clamp_offset};
use splitsave_core::types::{DbId, UserId};
use splitsave_db::models::notification::Notification;
use splitsave_db::models::partnership::Partnership;
use splitsave_db::repositories::{GoalRepo, NotificationRepo, PartnershipRepo};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::handlers::snapshot::today;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// If `true`, return only unread notifications. Defaults to `false`.
    pub unread_only: Option<bool>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for `POST /notifications/deadline-check`.
#[derive(Debug, Deserialize)]
pub struct DeadlineCheckQuery {
    pub window_days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread_count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked_count: u64,
}

#[derive(Debug, Serialize)]
pub struct DeadlineCheck {
    pub window_days: i64,
    pub created: usize,
}

const MAX_LIMIT: i64 = 100;
const DEFAULT_LIMIT: i64 = 50;

// ---------------------------------------------------------------------------
// Delivery helpers
// ---------------------------------------------------------------------------

/// Deliver `draft` to one user. Failures are logged, not propagated.
///
/// A duplicate of an unread notification is silently dropped.
pub async fn notify(pool: &PgPool, user_id: UserId, draft: &NotificationDraft) {
    if let Err(e) = NotificationRepo::create(pool, user_id, draft).await {
        tracing::warn!(
            %user_id,
            kind = draft.kind.as_str(),
            error = %e,
            "Failed to create notification",
        );
    }
}

/// Deliver `draft` to every member of the partnership.
pub async fn notify_members(pool: &PgPool, partnership: &Partnership, draft: &NotificationDraft) {
    for user_id in partnership.members() {
        notify(pool, user_id, draft).await;
    }
}

// ---------------------------------------------------------------------------
// Inbox
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<NotificationQuery>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);
    let unread_only = params.unread_only.unwrap_or(false);

    let notifications =
        NotificationRepo::list_for_user(&state.pool, auth.user_id, unread_only, limit, offset)
            .await?;

    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let unread_count = NotificationRepo::unread_count(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: UnreadCount { unread_count },
    }))
}

/// POST /api/v1/notifications/{id}/read
///
/// 404 if the notification does not belong to the caller.
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let found = NotificationRepo::mark_read(&state.pool, notification_id, auth.user_id).await?;
    if !found {
        return Err(AppError::not_found("Notification", notification_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MarkedRead>>> {
    let marked_count = NotificationRepo::mark_all_read(&state.pool, auth.user_id).await?;
    tracing::info!(user_id = %auth.user_id, marked_count, "Marked all notifications read");
    Ok(Json(DataResponse {
        data: MarkedRead { marked_count },
    }))
}

// ---------------------------------------------------------------------------
// Deadline reminders
// ---------------------------------------------------------------------------

/// POST /api/v1/notifications/deadline-check
///
/// Create reminders for goals in the caller's partnerships that are due
/// within `window_days`. A goal that already has an unread reminder for a
/// member is skipped for that member, including under concurrent checks.
pub async fn deadline_check(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DeadlineCheckQuery>,
) -> AppResult<Json<DataResponse<DeadlineCheck>>> {
    let window_days = params.window_days.unwrap_or(DEFAULT_REMINDER_WINDOW_DAYS);
    if !(0..=MAX_REMINDER_WINDOW_DAYS).contains(&window_days) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "window_days must be between 0 and {MAX_REMINDER_WINDOW_DAYS}, got {window_days}"
        ))));
    }

    let today = today();
    let mut created = 0usize;
    for partnership in PartnershipRepo::list_for_user(&state.pool, auth.user_id).await? {
        let goals: Vec<_> = GoalRepo::list_by_partnership(&state.pool, partnership.id)
            .await?
            .iter()
            .map(|g| g.snapshot())
            .collect();

        for draft in deadline_reminders(&goals, today, window_days) {
            for user_id in partnership.members() {
                if NotificationRepo::create(&state.pool, user_id, &draft).await?.is_some() {
                    created += 1;
                }
            }
        }
    }

    tracing::info!(user_id = %auth.user_id, window_days, created, "Deadline reminders checked");

    Ok(Json(DataResponse {
        data: DeadlineCheck {
            window_days,
            created,
        },
    }))
}
