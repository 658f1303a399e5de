//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped in the handler via `clamp_limit` / `clamp_offset`.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `?monthly_income=` override for the prioritization endpoints. Falls back
/// to the partnership's combined income.
#[derive(Debug, Deserialize)]
pub struct IncomeParams {
    pub monthly_income: Option<f64>,
}
