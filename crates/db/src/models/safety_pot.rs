//! Safety pot model and DTOs.

use serde::{Deserialize, Serialize};
use splitsave_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `safety_pots` table. One per partnership.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SafetyPot {
    pub id: DbId,
    pub partnership_id: DbId,
    pub balance: f64,
    pub target_amount: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Body of `POST .../safety-pot/deposit` and `.../withdraw`.
#[derive(Debug, Clone, Deserialize)]
pub struct PotMovementRequest {
    pub amount: f64,
    pub note: Option<String>,
}

/// DTO for updating the pot's target.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSafetyPot {
    pub target_amount: Option<f64>,
}
