//! Partnership entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use splitsave_core::expense_split::{income_shares, IncomeShares, Partner};
use splitsave_core::types::{DbId, Timestamp, UserId};
use sqlx::FromRow;

/// A row from the `partnerships` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Partnership {
    pub id: DbId,
    pub name: String,
    pub partner_a_id: UserId,
    pub partner_b_id: Option<UserId>,
    /// Monthly income, major units.
    pub partner_a_income: f64,
    pub partner_b_income: f64,
    pub currency: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Partnership {
    /// Which side `user_id` is on, if either.
    pub fn side_of(&self, user_id: UserId) -> Option<Partner> {
        if self.partner_a_id == user_id {
            Some(Partner::A)
        } else if self.partner_b_id == Some(user_id) {
            Some(Partner::B)
        } else {
            None
        }
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.side_of(user_id).is_some()
    }

    pub fn partner_id(&self, side: Partner) -> Option<UserId> {
        match side {
            Partner::A => Some(self.partner_a_id),
            Partner::B => self.partner_b_id,
        }
    }

    /// The other member, when the partnership has been joined.
    pub fn other_partner(&self, user_id: UserId) -> Option<UserId> {
        match self.side_of(user_id)? {
            Partner::A => self.partner_b_id,
            Partner::B => Some(self.partner_a_id),
        }
    }

    pub fn members(&self) -> impl Iterator<Item = UserId> {
        std::iter::once(self.partner_a_id).chain(self.partner_b_id)
    }

    pub fn combined_income(&self) -> f64 {
        self.partner_a_income.max(0.0) + self.partner_b_income.max(0.0)
    }

    pub fn income_shares(&self) -> IncomeShares {
        income_shares(self.partner_a_income, self.partner_b_income)
    }
}

/// A row from the `partnership_incomes` table: the incomes in effect from
/// `effective_on` until the next row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IncomeRecord {
    pub id: DbId,
    pub partnership_id: DbId,
    pub partner_a_income: f64,
    pub partner_b_income: f64,
    pub effective_on: NaiveDate,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl IncomeRecord {
    /// `(effective_on, combined income)`, the shape monthly history takes.
    pub fn change(&self) -> (NaiveDate, f64) {
        (
            self.effective_on,
            self.partner_a_income.max(0.0) + self.partner_b_income.max(0.0),
        )
    }
}

/// DTO for creating a partnership. The caller becomes partner A.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePartnership {
    pub name: String,
    pub partner_a_income: Option<f64>,
    pub partner_b_income: Option<f64>,
    /// Defaults to `USD` if omitted.
    pub currency: Option<String>,
}

/// DTO for updating a partnership. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePartnership {
    pub name: Option<String>,
    pub partner_a_income: Option<f64>,
    pub partner_b_income: Option<f64>,
    pub currency: Option<String>,
}

impl UpdatePartnership {
    pub fn changes_income(&self) -> bool {
        self.partner_a_income.is_some() || self.partner_b_income.is_some()
    }
}
