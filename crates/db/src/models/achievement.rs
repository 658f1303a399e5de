//! Achievement model.

use serde::Serialize;
use splitsave_core::achievements::AchievementKind;
use splitsave_core::types::{DbId, Timestamp, UserId};
use sqlx::FromRow;

/// A row from the `achievements` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Achievement {
    pub id: DbId,
    pub partnership_id: DbId,
    /// The member whose action triggered the unlock.
    pub user_id: UserId,
    pub kind: String,
    pub points: i32,
    pub unlocked_at: Timestamp,
}

impl Achievement {
    /// The catalog entry, or `None` for a kind no longer in the catalog.
    pub fn kind(&self) -> Option<AchievementKind> {
        self.kind.parse().ok()
    }
}
