//! Loaders that gather a partnership's rows into core-engine inputs.

use std::collections::HashMap;

use chrono::{Months, NaiveDate, Utc};
use splitsave_core::achievements::{contribution_streak, ProgressStats, StreakSummary};
use splitsave_core::behavior::{self, BehaviorAnalysis, ContributionPoint};
use splitsave_core::forecasting::{
    build_monthly_history, financial_health_score, month_start, HealthInputs, HealthScore,
    MonthlySnapshot,
};
use splitsave_core::goal_prioritization::{on_track_ratio, GoalSnapshot};
use splitsave_core::types::DbId;
use splitsave_db::models::goal::Goal;
use splitsave_db::models::partnership::Partnership;
use splitsave_db::models::safety_pot::SafetyPot;
use splitsave_db::repositories::{
    ContributionRepo, ExpenseRepo, GoalRepo, PartnershipRepo, SafetyPotRepo,
};
use sqlx::PgPool;

/// Months of history behind averages, the health score and forecasts.
pub const HISTORY_MONTHS: u32 = 6;

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// First month of the history window. Never earlier than the month the
/// partnership was created, so new households are not averaged over
/// empty months.
pub fn history_start(partnership: &Partnership, today: NaiveDate) -> NaiveDate {
    let window = month_start(today)
        .checked_sub_months(Months::new(HISTORY_MONTHS - 1))
        .unwrap_or(today);
    window.max(month_start(partnership.created_at.date_naive()))
}

/// Everything the analytics engines read for one partnership.
#[derive(Debug)]
pub struct PartnershipSnapshot {
    pub history: Vec<MonthlySnapshot>,
    pub goals: Vec<Goal>,
    pub contributions: Vec<ContributionPoint>,
    /// Contributed per goal within the history window.
    pub goal_savings: HashMap<DbId, f64>,
    pub safety_pot: SafetyPot,
    /// Current combined income.
    pub monthly_income: f64,
}

impl PartnershipSnapshot {
    pub async fn load(
        pool: &PgPool,
        partnership: &Partnership,
        today: NaiveDate,
    ) -> Result<Self, sqlx::Error> {
        let since = history_start(partnership, today);
        let expense_totals = ExpenseRepo::monthly_totals(pool, partnership.id, since).await?;
        let saving_totals = ContributionRepo::monthly_totals(pool, partnership.id, since).await?;
        let goals = GoalRepo::list_by_partnership(pool, partnership.id).await?;
        let rows = ContributionRepo::list_for_partnership(pool, partnership.id).await?;
        let safety_pot = SafetyPotRepo::get_or_create(pool, partnership.id).await?;
        let monthly_income = partnership.combined_income();

        let mut incomes: Vec<(NaiveDate, f64)> = PartnershipRepo::income_history(pool, partnership.id)
            .await?
            .iter()
            .map(|r| r.change())
            .collect();
        if incomes.is_empty() {
            incomes.push((today, monthly_income));
        }

        let mut goal_savings: HashMap<DbId, f64> = HashMap::new();
        for c in rows.iter().filter(|c| c.contributed_on >= since) {
            *goal_savings.entry(c.goal_id).or_default() += c.amount;
        }

        Ok(Self {
            history: build_monthly_history(since, today, &incomes, &expense_totals, &saving_totals),
            goals,
            contributions: rows.iter().map(|c| c.point()).collect(),
            goal_savings,
            safety_pot,
            monthly_income,
        })
    }

    pub fn goal_snapshots(&self) -> Vec<GoalSnapshot> {
        self.goals.iter().map(Goal::snapshot).collect()
    }

    pub fn health_score(&self, today: NaiveDate) -> HealthScore {
        let ratio = on_track_ratio(&self.goal_snapshots(), self.monthly_income, today);
        let inputs = HealthInputs::from_history(&self.history, self.safety_pot.balance, ratio);
        financial_health_score(&inputs)
    }

    pub fn behavior(&self, monthly_target: Option<f64>) -> BehaviorAnalysis {
        behavior::analyze(&self.contributions, monthly_target)
    }

    pub fn streak(&self, today: NaiveDate) -> StreakSummary {
        let dates: Vec<NaiveDate> = self.contributions.iter().map(|c| c.contributed_on).collect();
        contribution_streak(&dates, today)
    }

    /// Average monthly contribution to one goal over the history window.
    pub fn goal_monthly_pace(&self, goal_id: DbId) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        let saved = self.goal_savings.get(&goal_id).copied().unwrap_or(0.0);
        saved / self.history.len() as f64
    }
}

/// Counters the achievement rules are evaluated against.
pub async fn progress_stats(
    pool: &PgPool,
    partnership: &Partnership,
    today: NaiveDate,
) -> Result<ProgressStats, sqlx::Error> {
    let snapshot = PartnershipSnapshot::load(pool, partnership, today).await?;
    let streak = snapshot.streak(today);

    Ok(ProgressStats {
        expense_count: ExpenseRepo::count(pool, partnership.id).await?,
        goal_count: GoalRepo::count_created(pool, partnership.id).await?,
        contribution_count: snapshot.contributions.len() as i64,
        completed_goal_count: GoalRepo::count_completed(pool, partnership.id).await?,
        longest_streak: streak.longest,
        total_saved: GoalRepo::total_saved(pool, partnership.id).await?,
        safety_pot_balance: snapshot.safety_pot.balance,
        safety_pot_target: snapshot.safety_pot.target_amount,
        balanced_months: snapshot.history.iter().filter(|m| m.is_balanced()).count() as u32,
    })
}
