//! Goal contribution model and DTO.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use splitsave_core::behavior::ContributionPoint;
use splitsave_core::types::{DbId, Timestamp, UserId};
use sqlx::FromRow;

use crate::models::goal::Goal;

/// A row from the `contributions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contribution {
    pub id: DbId,
    pub goal_id: DbId,
    pub user_id: UserId,
    pub amount: f64,
    pub contributed_on: NaiveDate,
    pub note: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Contribution {
    pub fn point(&self) -> ContributionPoint {
        ContributionPoint {
            amount: self.amount,
            contributed_on: self.contributed_on,
        }
    }
}

/// DTO for adding money to a goal.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContribution {
    pub amount: f64,
    /// Defaults to today.
    pub contributed_on: Option<NaiveDate>,
    pub note: Option<String>,
}

/// A contribution together with the goal row it updated.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedContribution {
    pub contribution: Contribution,
    pub goal: Goal,
}
