//! Activity feed model.

use serde::Serialize;
use splitsave_core::activity::ActivityType;
use splitsave_core::types::{DbId, Timestamp, UserId};
use sqlx::FromRow;

/// A row from the `activities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Activity {
    pub id: DbId,
    pub partnership_id: DbId,
    pub user_id: UserId,
    pub activity_type: String,
    pub entity_type: String,
    pub entity_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

impl Activity {
    /// One-line, human-readable rendering of this entry.
    pub fn describe(&self) -> String {
        match self.activity_type.parse::<ActivityType>() {
            Ok(t) => t.describe(self.details.as_ref()),
            Err(_) => self.activity_type.replace('_', " "),
        }
    }
}

/// An activity about to be appended.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub partnership_id: DbId,
    pub user_id: UserId,
    pub activity_type: ActivityType,
    pub entity_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
}
