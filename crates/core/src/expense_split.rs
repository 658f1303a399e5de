//! Proportional expense splitting between two partners.
//!
//! Shared expenses are divided by each partner's share of the combined
//! income. All arithmetic that must add up exactly is done in cents.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::money::{from_cents, from_wide_cents, to_cents};

/// Which side of the partnership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partner {
    A,
    B,
}

impl Partner {
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Each partner's fraction of the combined income. Always sums to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IncomeShares {
    pub partner_a: f64,
    pub partner_b: f64,
}

impl IncomeShares {
    pub const EQUAL: Self = Self {
        partner_a: 0.5,
        partner_b: 0.5,
    };

    pub fn of(&self, partner: Partner) -> f64 {
        match partner {
            Partner::A => self.partner_a,
            Partner::B => self.partner_b,
        }
    }
}

/// Income shares for the two partners. Negative incomes count as zero and
/// two zero incomes split evenly.
pub fn income_shares(partner_a_income: f64, partner_b_income: f64) -> IncomeShares {
    let a = partner_a_income.max(0.0);
    let b = partner_b_income.max(0.0);
    let total = a + b;
    if total <= 0.0 {
        return IncomeShares::EQUAL;
    }
    let partner_a = a / total;
    IncomeShares {
        partner_a,
        partner_b: 1.0 - partner_a,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SplitAmounts {
    pub partner_a: f64,
    pub partner_b: f64,
}

impl SplitAmounts {
    pub fn of(&self, partner: Partner) -> f64 {
        match partner {
            Partner::A => self.partner_a,
            Partner::B => self.partner_b,
        }
    }
}

fn split_cents(amount_cents: i64, shares: IncomeShares) -> (i64, i64) {
    let a = (amount_cents as f64 * shares.partner_a).round() as i64;
    (a, amount_cents - a)
}

/// Split `amount` by income share. Partner B absorbs the rounding remainder
/// so both parts always sum to the original amount.
pub fn split_expense(amount: f64, shares: IncomeShares) -> SplitAmounts {
    let (a, b) = split_cents(to_cents(amount), shares);
    SplitAmounts {
        partner_a: from_cents(a),
        partner_b: from_cents(b),
    }
}

/// One expense as seen by the settlement calculation.
#[derive(Debug, Clone)]
pub struct SettlementItem {
    pub amount: f64,
    pub paid_by: Partner,
    pub is_shared: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Settlement {
    pub shares: IncomeShares,
    pub total_shared: f64,
    pub partner_a_paid: f64,
    pub partner_b_paid: f64,
    pub partner_a_fair_share: f64,
    pub partner_b_fair_share: f64,
    /// The partner who owes money, `None` when settled.
    pub debtor: Option<Partner>,
    pub amount_owed: f64,
}

/// Net out shared expenses: who owes whom, and how much.
///
/// Personal expenses are ignored. Totals accumulate in `i128` cents so no
/// number of rows can overflow them.
pub fn settle(items: &[SettlementItem], shares: IncomeShares) -> Settlement {
    let mut paid_a = 0i128;
    let mut paid_b = 0i128;
    let mut fair_a = 0i128;
    let mut fair_b = 0i128;
    // Positive: B owes A. Negative: A owes B.
    let mut balance = 0i128;

    for item in items.iter().filter(|i| i.is_shared) {
        let cents = to_cents(item.amount);
        let (share_a, share_b) = split_cents(cents, shares);
        let (cents, share_a, share_b) = (i128::from(cents), i128::from(share_a), i128::from(share_b));
        fair_a += share_a;
        fair_b += share_b;
        match item.paid_by {
            Partner::A => {
                paid_a += cents;
                balance += share_b;
            }
            Partner::B => {
                paid_b += cents;
                balance -= share_a;
            }
        }
    }

    let debtor = match balance.signum() {
        1 => Some(Partner::B),
        -1 => Some(Partner::A),
        _ => None,
    };

    Settlement {
        shares,
        total_shared: from_wide_cents(paid_a + paid_b),
        partner_a_paid: from_wide_cents(paid_a),
        partner_b_paid: from_wide_cents(paid_b),
        partner_a_fair_share: from_wide_cents(fair_a),
        partner_b_fair_share: from_wide_cents(fair_b),
        debtor,
        amount_owed: from_wide_cents(balance.abs()),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    /// Share of the grand total, 0–100.
    pub percentage: f64,
}

/// Total spend per category, largest first. Ties sort by name.
pub fn category_breakdown<'a>(items: impl IntoIterator<Item = (&'a str, f64)>) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, i128> = HashMap::new();
    for (category, amount) in items {
        *totals.entry(category).or_default() += i128::from(to_cents(amount));
    }
    let grand_total: i128 = totals.values().sum();

    let mut out: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, cents)| CategoryTotal {
            category: category.to_string(),
            total: from_wide_cents(cents),
            percentage: if grand_total > 0 {
                cents as f64 / grand_total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect();
    out.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });
    out
}
