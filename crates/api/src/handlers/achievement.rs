//! Handlers for partnership achievements, plus the evaluation hook other
//! handlers run after a mutation.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use splitsave_core::achievements::{
    evaluate_achievements, level_for_points, total_points, AchievementKind, StreakSummary,
};
use splitsave_core::activity::ActivityType;
use splitsave_core::notifications;
use splitsave_core::types::{DbId, Timestamp, UserId};
use splitsave_db::models::achievement::Achievement;
use splitsave_db::models::partnership::Partnership;
use splitsave_db::repositories::AchievementRepo;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::handlers::access::find_partnership_for_member;
use crate::handlers::activity::record;
use crate::handlers::notification::notify_members;
use crate::handlers::snapshot::{progress_stats, today, PartnershipSnapshot};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// One catalog entry with its unlock state.
#[derive(Debug, Serialize)]
pub struct AchievementView {
    pub kind: AchievementKind,
    pub title: &'static str,
    pub description: &'static str,
    pub points: i32,
    pub unlocked: bool,
    pub unlocked_at: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
pub struct AchievementSummary {
    pub achievements: Vec<AchievementView>,
    pub total_points: i32,
    pub level: i32,
    pub streak: StreakSummary,
}

#[derive(Debug, Serialize)]
pub struct EvaluationResult {
    pub unlocked: Vec<Achievement>,
}

/// Unlock everything the partnership has newly earned.
///
/// Each unlock is logged to the feed and announced to both members.
pub async fn evaluate_and_unlock(
    pool: &PgPool,
    partnership: &Partnership,
    triggered_by: UserId,
) -> Result<Vec<Achievement>, sqlx::Error> {
    let existing: Vec<AchievementKind> = AchievementRepo::list_by_partnership(pool, partnership.id)
        .await?
        .iter()
        .filter_map(Achievement::kind)
        .collect();
    let stats = progress_stats(pool, partnership, today()).await?;

    let mut unlocked = Vec::new();
    for kind in evaluate_achievements(&stats, &existing) {
        // A concurrent evaluation may have won the insert.
        let Some(achievement) = AchievementRepo::unlock(pool, partnership.id, triggered_by, kind).await? else {
            continue;
        };
        tracing::info!(
            partnership_id = partnership.id,
            kind = kind.as_str(),
            user_id = %triggered_by,
            "Achievement unlocked",
        );
        record(
            pool,
            partnership.id,
            triggered_by,
            ActivityType::AchievementUnlocked,
            Some(achievement.id),
            json!({ "kind": kind.as_str(), "title": kind.title(), "points": kind.points() }),
        )
        .await;
        notify_members(pool, partnership, &notifications::achievement_unlocked(kind, achievement.id)).await;
        unlocked.push(achievement);
    }
    Ok(unlocked)
}

/// Run [`evaluate_and_unlock`] after a mutation that has already succeeded.
pub async fn evaluate_quietly(pool: &PgPool, partnership: &Partnership, triggered_by: UserId) {
    if let Err(e) = evaluate_and_unlock(pool, partnership, triggered_by).await {
        tracing::warn!(partnership_id = partnership.id, error = %e, "Achievement evaluation failed");
    }
}

/// GET /api/v1/partnerships/{id}/achievements
///
/// The full catalog in catalog order, with points, level and streaks.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
) -> AppResult<Json<DataResponse<AchievementSummary>>> {
    let partnership = find_partnership_for_member(&state.pool, partnership_id, &auth).await?;
    let rows = AchievementRepo::list_by_partnership(&state.pool, partnership_id).await?;
    let today = today();
    let streak = PartnershipSnapshot::load(&state.pool, &partnership, today)
        .await?
        .streak(today);

    let unlocked_kinds: Vec<AchievementKind> = rows.iter().filter_map(Achievement::kind).collect();
    let achievements = AchievementKind::ALL
        .into_iter()
        .map(|kind| {
            let row = rows.iter().find(|r| r.kind() == Some(kind));
            AchievementView {
                kind,
                title: kind.title(),
                description: kind.description(),
                points: kind.points(),
                unlocked: row.is_some(),
                unlocked_at: row.map(|r| r.unlocked_at),
            }
        })
        .collect();
    let points = total_points(&unlocked_kinds);

    Ok(Json(DataResponse {
        data: AchievementSummary {
            achievements,
            total_points: points,
            level: level_for_points(points),
            streak,
        },
    }))
}

/// POST /api/v1/partnerships/{id}/achievements/evaluate
pub async fn evaluate(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(partnership_id): Path<DbId>,
) -> AppResult<Json<DataResponse<EvaluationResult>>> {
    let partnership = find_partnership_for_member(&state.pool, partnership_id, &auth).await?;
    let unlocked = evaluate_and_unlock(&state.pool, &partnership, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: EvaluationResult { unlocked },
    }))
}
