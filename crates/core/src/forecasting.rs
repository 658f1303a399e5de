//! Financial health scoring and savings forecasts.
//!
//! The health score is a fixed deduction table applied to averages of the
//! partnership's monthly history. Forecasts extrapolate the mean monthly
//! saving with a one-standard-deviation band.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::round_cents;
use crate::stats;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

pub const MAX_HEALTH_SCORE: i32 = 100;

/// Savings rate below which the largest savings penalty applies.
pub const CRITICAL_SAVINGS_RATE: f64 = 0.10;
/// Savings rate below which the smaller savings penalty applies.
pub const LOW_SAVINGS_RATE: f64 = 0.20;
/// Expense ratio above which the largest spending penalty applies.
pub const EXCESSIVE_EXPENSE_RATIO: f64 = 0.90;
/// Expense ratio above which the smaller spending penalty applies.
pub const HIGH_EXPENSE_RATIO: f64 = 0.70;
/// Months of expenses the safety pot should cover at minimum.
pub const MIN_EMERGENCY_MONTHS: f64 = 1.0;
/// Months of expenses considered a healthy safety pot.
pub const HEALTHY_EMERGENCY_MONTHS: f64 = 3.0;
/// Income coefficient of variation above which income counts as volatile.
pub const VOLATILE_INCOME_CV: f64 = 0.30;
/// Income coefficient of variation above which income counts as unsteady.
pub const UNSTEADY_INCOME_CV: f64 = 0.15;
/// Share of active goals that should be on track.
pub const MIN_GOALS_ON_TRACK: f64 = 0.5;

/// Score at or above which risk is `Low`.
pub const LOW_RISK_SCORE: u8 = 70;
/// Score at or above which risk is `Medium` (below `Low`).
pub const MEDIUM_RISK_SCORE: u8 = 40;

/// Longest forecast horizon accepted.
pub const MAX_FORECAST_MONTHS: u32 = 24;
/// Horizon used when the caller does not specify one.
pub const DEFAULT_FORECAST_MONTHS: u32 = 12;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Aggregated figures for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySnapshot {
    /// First day of the month.
    pub month: NaiveDate,
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
}

impl MonthlySnapshot {
    /// Some spending, and no more than the month's income.
    pub fn is_balanced(&self) -> bool {
        self.expenses > 0.0 && self.expenses <= self.income
    }
}

/// Income in effect on `date`, given `(effective_on, income)` changes sorted
/// oldest first.
///
/// The latest change on or before `date` wins. Dates before the first change
/// use the first change, so history never reads an income of zero just
/// because the record starts mid-window. `None` only when there are no changes.
pub fn income_on(changes: &[(NaiveDate, f64)], date: NaiveDate) -> Option<f64> {
    changes
        .iter()
        .take_while(|(effective_on, _)| *effective_on <= date)
        .last()
        .or_else(|| changes.first())
        .map(|(_, income)| *income)
}

/// One snapshot per calendar month from `from` through `to` (inclusive).
///
/// Each month's income is the one in effect on its last day (see
/// [`income_on`]); `incomes` must be sorted oldest first. `expenses` and
/// `savings` are per-month totals keyed by the first of the month; months
/// without an entry count as zero.
pub fn build_monthly_history(
    from: NaiveDate,
    to: NaiveDate,
    incomes: &[(NaiveDate, f64)],
    expenses: &[(NaiveDate, f64)],
    savings: &[(NaiveDate, f64)],
) -> Vec<MonthlySnapshot> {
    let total_for = |rows: &[(NaiveDate, f64)], month: NaiveDate| -> f64 {
        rows.iter()
            .filter(|(m, _)| month_start(*m) == month)
            .map(|(_, v)| v)
            .sum()
    };

    let last = month_start(to);
    let mut month = month_start(from);
    let mut out = Vec::new();
    while month <= last {
        let next = month.checked_add_months(Months::new(1));
        let month_end = next.and_then(|n| n.pred_opt()).unwrap_or(month);
        out.push(MonthlySnapshot {
            month,
            income: income_on(incomes, month_end).unwrap_or(0.0),
            expenses: round_cents(total_for(expenses, month)),
            savings: round_cents(total_for(savings, month)),
        });
        match next {
            Some(next) => month = next,
            None => break,
        }
    }
    out
}

/// Averages that drive the health score.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthInputs {
    pub avg_monthly_income: f64,
    pub avg_monthly_expenses: f64,
    pub avg_monthly_savings: f64,
    pub income_volatility: f64,
    pub safety_pot_balance: f64,
    pub goals_on_track_ratio: Option<f64>,
}

impl HealthInputs {
    pub fn from_history(
        history: &[MonthlySnapshot],
        safety_pot_balance: f64,
        goals_on_track_ratio: Option<f64>,
    ) -> Self {
        let incomes: Vec<f64> = history.iter().map(|m| m.income).collect();
        let expenses: Vec<f64> = history.iter().map(|m| m.expenses).collect();
        let savings: Vec<f64> = history.iter().map(|m| m.savings).collect();
        Self {
            avg_monthly_income: stats::mean(&incomes),
            avg_monthly_expenses: stats::mean(&expenses),
            avg_monthly_savings: stats::mean(&savings),
            income_volatility: stats::coefficient_of_variation(&incomes),
            safety_pot_balance,
            goals_on_track_ratio,
        }
    }

    /// `savings / income`, zero when there is no income.
    pub fn savings_rate(&self) -> f64 {
        if self.avg_monthly_income <= 0.0 {
            return 0.0;
        }
        self.avg_monthly_savings / self.avg_monthly_income
    }

    /// `expenses / income`. Spending with no income counts as fully spent.
    pub fn expense_ratio(&self) -> f64 {
        if self.avg_monthly_income <= 0.0 {
            return if self.avg_monthly_expenses > 0.0 { 1.0 } else { 0.0 };
        }
        self.avg_monthly_expenses / self.avg_monthly_income
    }

    /// Months of average expenses the safety pot covers. `None` without expenses.
    pub fn emergency_coverage_months(&self) -> Option<f64> {
        if self.avg_monthly_expenses <= 0.0 {
            return None;
        }
        Some(self.safety_pot_balance.max(0.0) / self.avg_monthly_expenses)
    }
}

// ---------------------------------------------------------------------------
// Reason codes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthReason {
    CriticalSavingsRate,
    LowSavingsRate,
    ExcessiveSpending,
    HighSpending,
    NoEmergencyFund,
    ThinEmergencyFund,
    VolatileIncome,
    UnsteadyIncome,
    GoalsOffTrack,
}

impl HealthReason {
    /// Points deducted from the health score.
    pub fn penalty(self) -> i32 {
        match self {
            Self::CriticalSavingsRate => 30,
            Self::LowSavingsRate => 20,
            Self::ExcessiveSpending => 25,
            Self::HighSpending => 10,
            Self::NoEmergencyFund => 20,
            Self::ThinEmergencyFund => 10,
            Self::VolatileIncome => 15,
            Self::UnsteadyIncome => 5,
            Self::GoalsOffTrack => 10,
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            Self::CriticalSavingsRate => {
                "You are saving less than 10% of your income. Start with an automatic transfer of at least 10% on payday."
            }
            Self::LowSavingsRate => {
                "Aim to save at least 20% of your combined income. Review subscriptions and recurring costs first."
            }
            Self::ExcessiveSpending => {
                "Expenses are consuming over 90% of income. Agree on a shared monthly spending cap."
            }
            Self::HighSpending => {
                "Expenses are above 70% of income. Look for one or two categories to trim together."
            }
            Self::NoEmergencyFund => {
                "Your safety pot covers less than one month of expenses. Make it your first priority."
            }
            Self::ThinEmergencyFund => {
                "Build your safety pot up to three months of expenses before adding new goals."
            }
            Self::VolatileIncome => {
                "Your income varies a lot month to month. Budget against your lowest recent month."
            }
            Self::UnsteadyIncome => {
                "Income is somewhat uneven. Keep a small buffer for leaner months."
            }
            Self::GoalsOffTrack => {
                "Most of your goals are behind schedule. Revisit their deadlines or priorities."
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Health score
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        if score >= LOW_RISK_SCORE {
            Self::Low
        } else if score >= MEDIUM_RISK_SCORE {
            Self::Medium
        } else {
            Self::High
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthFactor {
    pub reason: HealthReason,
    pub penalty: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthScore {
    pub score: u8,
    pub risk_level: RiskLevel,
    pub savings_rate: f64,
    pub expense_ratio: f64,
    pub emergency_coverage_months: Option<f64>,
    pub factors: Vec<HealthFactor>,
    pub recommendations: Vec<String>,
}

/// Score the partnership's finances from 0 to 100.
pub fn financial_health_score(inputs: &HealthInputs) -> HealthScore {
    let mut reasons = Vec::new();

    let savings_rate = inputs.savings_rate();
    if savings_rate < CRITICAL_SAVINGS_RATE {
        reasons.push(HealthReason::CriticalSavingsRate);
    } else if savings_rate < LOW_SAVINGS_RATE {
        reasons.push(HealthReason::LowSavingsRate);
    }

    let expense_ratio = inputs.expense_ratio();
    if expense_ratio > EXCESSIVE_EXPENSE_RATIO {
        reasons.push(HealthReason::ExcessiveSpending);
    } else if expense_ratio > HIGH_EXPENSE_RATIO {
        reasons.push(HealthReason::HighSpending);
    }

    let coverage = inputs.emergency_coverage_months();
    match coverage {
        Some(months) if months < MIN_EMERGENCY_MONTHS => reasons.push(HealthReason::NoEmergencyFund),
        Some(months) if months < HEALTHY_EMERGENCY_MONTHS => {
            reasons.push(HealthReason::ThinEmergencyFund)
        }
        _ => {}
    }

    if inputs.income_volatility > VOLATILE_INCOME_CV {
        reasons.push(HealthReason::VolatileIncome);
    } else if inputs.income_volatility > UNSTEADY_INCOME_CV {
        reasons.push(HealthReason::UnsteadyIncome);
    }

    if matches!(inputs.goals_on_track_ratio, Some(ratio) if ratio < MIN_GOALS_ON_TRACK) {
        reasons.push(HealthReason::GoalsOffTrack);
    }

    let total_penalty: i32 = reasons.iter().map(|r| r.penalty()).sum();
    let score = (MAX_HEALTH_SCORE - total_penalty).clamp(0, MAX_HEALTH_SCORE) as u8;

    HealthScore {
        score,
        risk_level: RiskLevel::from_score(score),
        savings_rate,
        expense_ratio,
        emergency_coverage_months: coverage,
        recommendations: reasons.iter().map(|r| r.recommendation().to_string()).collect(),
        factors: reasons
            .into_iter()
            .map(|reason| HealthFactor {
                reason,
                penalty: reason.penalty(),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ForecastPoint {
    pub month: NaiveDate,
    pub projected_balance: f64,
    pub low_estimate: f64,
    pub high_estimate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavingsForecast {
    pub starting_balance: f64,
    pub average_monthly_savings: f64,
    pub savings_std_dev: f64,
    pub points: Vec<ForecastPoint>,
}

/// Validate a requested horizon, falling back to [`DEFAULT_FORECAST_MONTHS`].
pub fn validate_horizon(months: Option<u32>) -> Result<u32, CoreError> {
    let months = months.unwrap_or(DEFAULT_FORECAST_MONTHS);
    if months == 0 || months > MAX_FORECAST_MONTHS {
        return Err(CoreError::Validation(format!(
            "Forecast horizon must be between 1 and {MAX_FORECAST_MONTHS} months, got {months}"
        )));
    }
    Ok(months)
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Project the savings balance `horizon` months past `from`.
pub fn forecast_savings(
    history: &[MonthlySnapshot],
    starting_balance: f64,
    horizon: u32,
    from: NaiveDate,
) -> SavingsForecast {
    let savings: Vec<f64> = history.iter().map(|m| m.savings).collect();
    let avg = stats::mean(&savings);
    let sd = stats::std_dev(&savings);
    let base = month_start(from);

    let points = (1..=horizon)
        .filter_map(|n| {
            let month = base.checked_add_months(Months::new(n))?;
            let n = f64::from(n);
            Some(ForecastPoint {
                month,
                projected_balance: round_cents(starting_balance + n * avg),
                low_estimate: round_cents(starting_balance + n * (avg - sd)),
                high_estimate: round_cents(starting_balance + n * (avg + sd)),
            })
        })
        .collect();

    SavingsForecast {
        starting_balance,
        average_monthly_savings: round_cents(avg),
        savings_std_dev: round_cents(sd),
        points,
    }
}

/// Date on which `remaining` is reached at `avg_monthly_contribution`.
///
/// Returns `today` when nothing remains and `None` when nothing is being saved.
pub fn project_goal_completion(
    remaining: f64,
    avg_monthly_contribution: f64,
    today: NaiveDate,
) -> Option<NaiveDate> {
    if remaining <= 0.0 {
        return Some(today);
    }
    if avg_monthly_contribution <= 0.0 {
        return None;
    }
    let months = (remaining / avg_monthly_contribution).ceil();
    if months > f64::from(u32::MAX) {
        return None;
    }
    today.checked_add_months(Months::new(months as u32))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
