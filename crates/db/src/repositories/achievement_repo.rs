//! Repository for the `achievements` table.

use splitsave_core::achievements::AchievementKind;
use splitsave_core::types::{DbId, UserId};
use sqlx::PgPool;

use crate::models::achievement::Achievement;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, partnership_id, user_id, kind, points, unlocked_at";

/// Provides unlock and listing operations for achievements.
pub struct AchievementRepo;

impl AchievementRepo {
    /// Achievements unlocked by the partnership, in unlock order.
    pub async fn list_by_partnership(
        pool: &PgPool,
        partnership_id: DbId,
    ) -> Result<Vec<Achievement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM achievements
             WHERE partnership_id = $1
             ORDER BY unlocked_at ASC, id ASC"
        );
        sqlx::query_as::<_, Achievement>(&query)
            .bind(partnership_id)
            .fetch_all(pool)
            .await
    }

    /// Record an unlock. Returns `None` if the partnership already has it,
    /// which makes concurrent evaluations safe.
    pub async fn unlock(
        pool: &PgPool,
        partnership_id: DbId,
        user_id: UserId,
        kind: AchievementKind,
    ) -> Result<Option<Achievement>, sqlx::Error> {
        let query = format!(
            "INSERT INTO achievements (partnership_id, user_id, kind, points)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_achievements_partnership_kind DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Achievement>(&query)
            .bind(partnership_id)
            .bind(user_id)
            .bind(kind.as_str())
            .bind(kind.points())
            .fetch_optional(pool)
            .await
    }
}
