//! Gamification: the achievement catalog, unlock rules, points and
//! contribution streaks.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Points needed per level.
pub const POINTS_PER_LEVEL: i32 = 100;
/// Months with spending at or below income needed for `BalancedBudget`.
pub const BALANCED_MONTHS_REQUIRED: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    FirstExpense,
    FirstGoal,
    FirstContribution,
    GoalCompleted,
    #[serde(rename = "streak_7")]
    Streak7,
    #[serde(rename = "streak_30")]
    Streak30,
    #[serde(rename = "savings_1k")]
    Savings1k,
    #[serde(rename = "savings_10k")]
    Savings10k,
    SafetyPotFunded,
    BalancedBudget,
}

impl AchievementKind {
    /// Catalog order; evaluation reports unlocks in this order.
    pub const ALL: [AchievementKind; 10] = [
        Self::FirstExpense,
        Self::FirstGoal,
        Self::FirstContribution,
        Self::GoalCompleted,
        Self::Streak7,
        Self::Streak30,
        Self::Savings1k,
        Self::Savings10k,
        Self::SafetyPotFunded,
        Self::BalancedBudget,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstExpense => "first_expense",
            Self::FirstGoal => "first_goal",
            Self::FirstContribution => "first_contribution",
            Self::GoalCompleted => "goal_completed",
            Self::Streak7 => "streak_7",
            Self::Streak30 => "streak_30",
            Self::Savings1k => "savings_1k",
            Self::Savings10k => "savings_10k",
            Self::SafetyPotFunded => "safety_pot_funded",
            Self::BalancedBudget => "balanced_budget",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::FirstExpense => "Split Starter",
            Self::FirstGoal => "Dream Big",
            Self::FirstContribution => "First Deposit",
            Self::GoalCompleted => "Goal Getter",
            Self::Streak7 => "Week Warrior",
            Self::Streak30 => "Habit Builder",
            Self::Savings1k => "Four Figures",
            Self::Savings10k => "Five Figures",
            Self::SafetyPotFunded => "Safety Net",
            Self::BalancedBudget => "Balanced Books",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::FirstExpense => "Log your first shared expense.",
            Self::FirstGoal => "Create your first savings goal.",
            Self::FirstContribution => "Make your first contribution to a goal.",
            Self::GoalCompleted => "Fully fund a savings goal.",
            Self::Streak7 => "Contribute on 7 consecutive days.",
            Self::Streak30 => "Contribute on 30 consecutive days.",
            Self::Savings1k => "Save 1,000 across all goals.",
            Self::Savings10k => "Save 10,000 across all goals.",
            Self::SafetyPotFunded => "Reach your safety pot target.",
            Self::BalancedBudget => "Spend no more than you earn for 3 months.",
        }
    }

    pub fn points(self) -> i32 {
        match self {
            Self::FirstExpense | Self::FirstGoal | Self::FirstContribution => 10,
            Self::Streak7 => 25,
            Self::GoalCompleted | Self::Savings1k | Self::BalancedBudget => 50,
            Self::Streak30 | Self::SafetyPotFunded => 75,
            Self::Savings10k => 100,
        }
    }

    fn is_earned(self, stats: &ProgressStats) -> bool {
        match self {
            Self::FirstExpense => stats.expense_count > 0,
            Self::FirstGoal => stats.goal_count > 0,
            Self::FirstContribution => stats.contribution_count > 0,
            Self::GoalCompleted => stats.completed_goal_count > 0,
            Self::Streak7 => stats.longest_streak >= 7,
            Self::Streak30 => stats.longest_streak >= 30,
            Self::Savings1k => stats.total_saved >= 1_000.0,
            Self::Savings10k => stats.total_saved >= 10_000.0,
            Self::SafetyPotFunded => matches!(
                stats.safety_pot_target,
                Some(target) if target > 0.0 && stats.safety_pot_balance >= target
            ),
            Self::BalancedBudget => stats.balanced_months >= BALANCED_MONTHS_REQUIRED,
        }
    }
}

impl FromStr for AchievementKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown achievement kind: {s}")))
    }
}

/// Aggregate progress for one partnership.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProgressStats {
    pub expense_count: i64,
    pub goal_count: i64,
    pub contribution_count: i64,
    pub completed_goal_count: i64,
    pub longest_streak: u32,
    pub total_saved: f64,
    pub safety_pot_balance: f64,
    pub safety_pot_target: Option<f64>,
    pub balanced_months: u32,
}

/// Achievements earned by `stats` that are not yet in `unlocked`, in
/// catalog order.
pub fn evaluate_achievements(stats: &ProgressStats, unlocked: &[AchievementKind]) -> Vec<AchievementKind> {
    AchievementKind::ALL
        .into_iter()
        .filter(|kind| !unlocked.contains(kind) && kind.is_earned(stats))
        .collect()
}

pub fn total_points(kinds: &[AchievementKind]) -> i32 {
    kinds.iter().map(|k| k.points()).sum()
}

/// Level 1 at 0 points, plus one level per [`POINTS_PER_LEVEL`].
pub fn level_for_points(points: i32) -> i32 {
    points.max(0) / POINTS_PER_LEVEL + 1
}

// ---------------------------------------------------------------------------
// Streaks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreakSummary {
    pub current: u32,
    pub longest: u32,
    pub last_contribution: Option<NaiveDate>,
}

/// Consecutive-day contribution streaks.
///
/// Multiple contributions on one day count once and future dates are
/// ignored. The current streak is alive only if the last contribution was
/// today or yesterday.
pub fn contribution_streak(dates: &[NaiveDate], today: NaiveDate) -> StreakSummary {
    let days: BTreeSet<NaiveDate> = dates.iter().copied().filter(|d| *d <= today).collect();
    let Some(&last) = days.iter().next_back() else {
        return StreakSummary::default();
    };

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for &day in &days {
        run = match prev {
            Some(p) if (day - p).num_days() == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }

    let current = if (today - last).num_days() <= 1 { run } else { 0 };

    StreakSummary {
        current,
        longest,
        last_contribution: Some(last),
    }
}
