//! Goal entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use splitsave_core::goal_prioritization::{GoalPriority, GoalSnapshot};
use splitsave_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `goals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Goal {
    pub id: DbId,
    pub partnership_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub target_amount: f64,
    pub current_amount: f64,
    pub target_date: Option<NaiveDate>,
    #[sqlx(try_from = "i16")]
    pub priority: GoalPriority,
    pub category: String,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Goal {
    pub fn snapshot(&self) -> GoalSnapshot {
        GoalSnapshot {
            id: self.id,
            name: self.name.clone(),
            target_amount: self.target_amount,
            current_amount: self.current_amount,
            target_date: self.target_date,
            priority: self.priority,
        }
    }
}

/// DTO for creating a goal.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGoal {
    pub name: String,
    pub description: Option<String>,
    pub target_amount: f64,
    /// Defaults to 0.
    pub current_amount: Option<f64>,
    pub target_date: Option<NaiveDate>,
    /// Defaults to `Medium` (3).
    pub priority: Option<GoalPriority>,
    /// Defaults to `general`.
    pub category: Option<String>,
}

/// DTO for updating a goal. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateGoal {
    pub name: Option<String>,
    pub description: Option<String>,
    pub target_amount: Option<f64>,
    /// `Some(None)` (a JSON `null`) removes the deadline.
    #[serde(default, deserialize_with = "super::nullable")]
    pub target_date: Option<Option<NaiveDate>>,
    pub priority: Option<GoalPriority>,
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_tells_missing_deadline_from_null() {
        let untouched: UpdateGoal = serde_json::from_str(r#"{ "name": "Car" }"#).unwrap();
        assert_eq!(untouched.target_date, None);

        let cleared: UpdateGoal = serde_json::from_str(r#"{ "target_date": null }"#).unwrap();
        assert_eq!(cleared.target_date, Some(None));

        let moved: UpdateGoal = serde_json::from_str(r#"{ "target_date": "2027-03-01" }"#).unwrap();
        assert_eq!(moved.target_date, Some(NaiveDate::from_ymd_opt(2027, 3, 1)));
    }
}
