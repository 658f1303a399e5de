//! Goal prioritization: feasibility scoring, weighted allocation and
//! recommendations over a partnership's savings goals.
//!
//! Only *active* goals take part: a goal is active when it has a deadline in
//! the future and is not yet fully funded.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::round_cents;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fraction of monthly income assumed to be available for goal savings.
pub const AFFORDABLE_INCOME_RATIO: f64 = 0.3;
/// Floor applied to the feasibility score when computing weights, so an
/// infeasible goal still receives a small share.
pub const MIN_FEASIBILITY_WEIGHT: f64 = 0.1;
/// Feasibility below which a goal is flagged for adjustment.
pub const LOW_FEASIBILITY_THRESHOLD: f64 = 0.5;
/// Multiplier applied to a year of the current monthly requirement when
/// suggesting a reduced target.
pub const REDUCED_TARGET_MULTIPLIER: f64 = 1.2;
/// Months added to the deadline when suggesting an extension.
pub const DEADLINE_EXTENSION_MONTHS: u32 = 3;
/// Days per month used when converting a deadline into months.
pub const DAYS_PER_MONTH: f64 = 30.0;
/// Lower bound on months-to-deadline; anything due sooner needs the full
/// remainder this month.
pub const MIN_MONTHS_TO_DEADLINE: f64 = 1.0;

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Goal priority, 1 (critical) through 5 (optional).
///
/// Serialized as its integer level. Ordering follows urgency, so
/// `Critical < Optional`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum GoalPriority {
    Critical = 1,
    High = 2,
    Medium = 3,
    Low = 4,
    Optional = 5,
}

impl GoalPriority {
    pub fn level(self) -> i16 {
        self as i16
    }

    pub fn from_level(level: i16) -> Result<Self, CoreError> {
        match level {
            1 => Ok(Self::Critical),
            2 => Ok(Self::High),
            3 => Ok(Self::Medium),
            4 => Ok(Self::Low),
            5 => Ok(Self::Optional),
            other => Err(CoreError::Validation(format!(
                "priority must be between 1 and 5, got {other}"
            ))),
        }
    }

    /// `6 - level`: critical goals weigh 5, optional goals weigh 1.
    pub fn weight_factor(self) -> f64 {
        f64::from(6 - self.level())
    }

    /// One level more urgent. `Critical` stays `Critical`.
    pub fn raised(self) -> Self {
        match self {
            Self::Critical | Self::High => Self::Critical,
            Self::Medium => Self::High,
            Self::Low => Self::Medium,
            Self::Optional => Self::Low,
        }
    }

    /// Low and optional goals.
    pub fn is_low(self) -> bool {
        self >= Self::Low
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Optional => "optional",
        }
    }
}

impl TryFrom<i16> for GoalPriority {
    type Error = CoreError;

    fn try_from(level: i16) -> Result<Self, Self::Error> {
        Self::from_level(level)
    }
}

impl From<GoalPriority> for i16 {
    fn from(priority: GoalPriority) -> Self {
        priority.level()
    }
}

// ---------------------------------------------------------------------------
// Goal snapshot
// ---------------------------------------------------------------------------

/// The subset of a goal row the engine needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalSnapshot {
    pub id: DbId,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub target_date: Option<NaiveDate>,
    pub priority: GoalPriority,
}

impl GoalSnapshot {
    /// Amount still to be saved, never negative.
    pub fn remaining(&self) -> f64 {
        (self.target_amount - self.current_amount).max(0.0)
    }

    pub fn is_funded(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    pub fn is_active(&self, today: NaiveDate) -> bool {
        matches!(self.target_date, Some(date) if date > today) && !self.is_funded()
    }
}

// ---------------------------------------------------------------------------
// Feasibility
// ---------------------------------------------------------------------------

/// Months between `today` and `target`, floored at [`MIN_MONTHS_TO_DEADLINE`].
pub fn months_until(target: NaiveDate, today: NaiveDate) -> f64 {
    let days = (target - today).num_days() as f64;
    (days / DAYS_PER_MONTH).max(MIN_MONTHS_TO_DEADLINE)
}

/// Monthly saving needed to reach the target by its deadline.
///
/// Goals without a deadline have no monthly requirement.
pub fn monthly_needed(goal: &GoalSnapshot, today: NaiveDate) -> f64 {
    match goal.target_date {
        Some(date) => goal.remaining() / months_until(date, today),
        None => 0.0,
    }
}

/// Largest monthly amount considered affordable for goals.
pub fn max_affordable(monthly_income: f64) -> f64 {
    monthly_income.max(0.0) * AFFORDABLE_INCOME_RATIO
}

/// Heuristic 0–1 score of whether the goal's monthly requirement fits
/// within the affordable share of income.
///
/// Returns 0 when income is not positive or the goal has no deadline.
pub fn calculate_feasibility(goal: &GoalSnapshot, monthly_income: f64, today: NaiveDate) -> f64 {
    if monthly_income <= 0.0 || goal.target_date.is_none() {
        return 0.0;
    }
    let needed = monthly_needed(goal, today);
    if needed <= 0.0 {
        return 1.0;
    }
    (max_affordable(monthly_income) / needed).min(1.0)
}

/// Allocation weight: `(6 - priority) * max(feasibility, 0.1)`.
pub fn goal_weight(priority: GoalPriority, feasibility: f64) -> f64 {
    priority.weight_factor() * feasibility.max(MIN_FEASIBILITY_WEIGHT)
}

/// Share of active goals whose feasibility is at least
/// [`LOW_FEASIBILITY_THRESHOLD`]. `None` when there are no active goals.
pub fn on_track_ratio(goals: &[GoalSnapshot], monthly_income: f64, today: NaiveDate) -> Option<f64> {
    let active: Vec<&GoalSnapshot> = goals.iter().filter(|g| g.is_active(today)).collect();
    if active.is_empty() {
        return None;
    }
    let on_track = active
        .iter()
        .filter(|g| calculate_feasibility(g, monthly_income, today) >= LOW_FEASIBILITY_THRESHOLD)
        .count();
    Some(on_track as f64 / active.len() as f64)
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// One active goal's share of the monthly savings budget.
#[derive(Debug, Clone, Serialize)]
pub struct GoalAllocation {
    pub goal_id: DbId,
    pub name: String,
    pub priority: GoalPriority,
    pub feasibility_score: f64,
    pub weight: f64,
    /// Percentage of the savings budget, 0–100.
    pub recommended_allocation: f64,
    pub monthly_needed: f64,
    pub suggested_monthly_amount: f64,
}

/// Distribute the affordable savings budget across active goals.
///
/// Percentages are normalized over active goals only and the result is
/// sorted by priority (most urgent first), then by earliest deadline.
pub fn allocate(goals: &[GoalSnapshot], monthly_income: f64, today: NaiveDate) -> Vec<GoalAllocation> {
    let mut scored: Vec<(&GoalSnapshot, f64, f64)> = goals
        .iter()
        .filter(|g| g.is_active(today))
        .map(|g| {
            let feasibility = calculate_feasibility(g, monthly_income, today);
            (g, feasibility, goal_weight(g.priority, feasibility))
        })
        .collect();

    let total_weight: f64 = scored.iter().map(|(_, _, w)| w).sum();
    if total_weight <= 0.0 {
        return Vec::new();
    }

    scored.sort_by(|(a, _, _), (b, _, _)| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.target_date.cmp(&b.target_date))
    });

    let budget = max_affordable(monthly_income);
    scored
        .into_iter()
        .map(|(goal, feasibility, weight)| {
            let share = weight / total_weight;
            GoalAllocation {
                goal_id: goal.id,
                name: goal.name.clone(),
                priority: goal.priority,
                feasibility_score: feasibility,
                weight,
                recommended_allocation: share * 100.0,
                monthly_needed: round_cents(monthly_needed(goal, today)),
                suggested_monthly_amount: round_cents(share * budget),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Amount,
    Deadline,
    Priority,
    SavingsRate,
}

/// A suggested adjustment to a single goal.
#[derive(Debug, Clone, Serialize)]
pub struct GoalRecommendation {
    pub goal_id: DbId,
    pub goal_name: String,
    pub kind: RecommendationKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_target_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_target_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_priority: Option<GoalPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_monthly_amount: Option<f64>,
}

impl GoalRecommendation {
    fn new(goal: &GoalSnapshot, kind: RecommendationKind, message: String) -> Self {
        Self {
            goal_id: goal.id,
            goal_name: goal.name.clone(),
            kind,
            message,
            suggested_target_amount: None,
            suggested_target_date: None,
            suggested_priority: None,
            suggested_monthly_amount: None,
        }
    }
}

/// Flag active goals whose plan does not fit the household budget.
///
/// - feasibility < 0.5: suggest a reduced target and a 3-month extension;
/// - low or optional priority and infeasible: suggest raising the priority;
/// - monthly requirement above 30% of income: suggest a higher savings rate.
pub fn generate_recommendations(
    goals: &[GoalSnapshot],
    monthly_income: f64,
    today: NaiveDate,
) -> Vec<GoalRecommendation> {
    let affordable = max_affordable(monthly_income);
    let mut out = Vec::new();

    for goal in goals.iter().filter(|g| g.is_active(today)) {
        let feasibility = calculate_feasibility(goal, monthly_income, today);
        let needed = monthly_needed(goal, today);
        let infeasible = feasibility < LOW_FEASIBILITY_THRESHOLD;

        if infeasible {
            let reduced = round_cents(needed * 12.0 * REDUCED_TARGET_MULTIPLIER);
            let mut rec = GoalRecommendation::new(
                goal,
                RecommendationKind::Amount,
                format!(
                    "\"{}\" needs {needed:.2} per month. Consider adjusting the target to {reduced:.2}.",
                    goal.name
                ),
            );
            rec.suggested_target_amount = Some(reduced);
            out.push(rec);

            let extended = goal
                .target_date
                .and_then(|d| d.checked_add_months(Months::new(DEADLINE_EXTENSION_MONTHS)));
            if let Some(extended) = extended {
                let mut rec = GoalRecommendation::new(
                    goal,
                    RecommendationKind::Deadline,
                    format!(
                        "Extending \"{}\" by {DEADLINE_EXTENSION_MONTHS} months to {extended} lowers the monthly requirement.",
                        goal.name
                    ),
                );
                rec.suggested_target_date = Some(extended);
                out.push(rec);
            }
        }

        if infeasible && goal.priority.is_low() {
            let raised = goal.priority.raised();
            let mut rec = GoalRecommendation::new(
                goal,
                RecommendationKind::Priority,
                format!(
                    "\"{}\" is falling behind at {} priority. Raising it to {} gives it a larger share.",
                    goal.name,
                    goal.priority.label(),
                    raised.label()
                ),
            );
            rec.suggested_priority = Some(raised);
            out.push(rec);
        }

        if needed > affordable {
            let mut rec = GoalRecommendation::new(
                goal,
                RecommendationKind::SavingsRate,
                format!(
                    "\"{}\" requires {needed:.2} per month, more than 30% of income ({affordable:.2}). Consider increasing your savings rate.",
                    goal.name
                ),
            );
            rec.suggested_monthly_amount = Some(round_cents(needed));
            out.push(rec);
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn goal(id: DbId, priority: GoalPriority, target: f64, current: f64, due: Option<NaiveDate>) -> GoalSnapshot {
        GoalSnapshot {
            id,
            name: format!("goal-{id}"),
            target_amount: target,
            current_amount: current,
            target_date: due,
            priority,
        }
    }

    // -- GoalPriority --

    #[test]
    fn priority_levels_round_trip() {
        for level in 1..=5 {
            assert_eq!(GoalPriority::from_level(level).unwrap().level(), level);
        }
        assert!(GoalPriority::from_level(0).is_err());
        assert!(GoalPriority::from_level(6).is_err());
    }

    #[test]
    fn priority_serializes_as_integer() {
        let json = serde_json::to_string(&GoalPriority::Low).unwrap();
        assert_eq!(json, "4");
        let parsed: GoalPriority = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, GoalPriority::High);
        assert!(serde_json::from_str::<GoalPriority>("9").is_err());
    }

    #[test]
    fn raised_priority_saturates_at_critical() {
        assert_eq!(GoalPriority::Optional.raised(), GoalPriority::Low);
        assert_eq!(GoalPriority::Critical.raised(), GoalPriority::Critical);
    }

    // -- Feasibility --

    #[test]
    fn feasibility_zero_without_income() {
        let g = goal(1, GoalPriority::High, 1000.0, 0.0, Some(date(2026, 1, 1)));
        assert_eq!(calculate_feasibility(&g, 0.0, today()), 0.0);
        assert_eq!(calculate_feasibility(&g, -100.0, today()), 0.0);
    }

    #[test]
    fn feasibility_zero_without_deadline() {
        let g = goal(1, GoalPriority::High, 1000.0, 0.0, None);
        assert_eq!(calculate_feasibility(&g, 5000.0, today()), 0.0);
    }

    #[test]
    fn feasibility_caps_at_one() {
        let g = goal(1, GoalPriority::High, 1200.0, 0.0, Some(date(2026, 1, 1)));
        assert_eq!(calculate_feasibility(&g, 10_000.0, today()), 1.0);
    }

    #[test]
    fn feasibility_is_ratio_of_affordable_to_needed() {
        // 300 days = 10 months; 6000 remaining => 600/month; affordable = 300.
        let due = today() + chrono::Duration::days(300);
        let g = goal(1, GoalPriority::High, 6000.0, 0.0, Some(due));
        let f = calculate_feasibility(&g, 1000.0, today());
        assert!((f - 0.5).abs() < 1e-9, "got {f}");
    }

    #[test]
    fn near_deadline_uses_one_month_floor() {
        let due = today() + chrono::Duration::days(10);
        let g = goal(1, GoalPriority::High, 500.0, 0.0, Some(due));
        assert!((monthly_needed(&g, today()) - 500.0).abs() < 1e-9);
    }

    // -- Allocation --

    #[test]
    fn allocation_matches_worked_example() {
        let goals = vec![
            goal(1, GoalPriority::Critical, 1200.0, 0.0, Some(date(2026, 1, 1))),
            goal(2, GoalPriority::Medium, 1200.0, 0.0, Some(date(2026, 1, 1))),
        ];
        let alloc = allocate(&goals, 10_000.0, today());
        assert_eq!(alloc.len(), 2);
        assert_eq!(alloc[0].weight, 5.0);
        assert_eq!(alloc[1].weight, 3.0);
        assert!((alloc[0].recommended_allocation - 62.5).abs() < 1e-9);
        assert!((alloc[1].recommended_allocation - 37.5).abs() < 1e-9);
    }

    #[test]
    fn allocation_sorted_by_priority() {
        let goals = vec![
            goal(1, GoalPriority::Optional, 1000.0, 0.0, Some(date(2026, 6, 1))),
            goal(2, GoalPriority::Critical, 1000.0, 0.0, Some(date(2026, 6, 1))),
            goal(3, GoalPriority::Medium, 1000.0, 0.0, Some(date(2026, 6, 1))),
        ];
        let ids: Vec<DbId> = allocate(&goals, 8000.0, today()).iter().map(|a| a.goal_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn allocation_skips_inactive_goals() {
        let goals = vec![
            goal(1, GoalPriority::High, 1000.0, 1000.0, Some(date(2026, 1, 1))),
            goal(2, GoalPriority::High, 1000.0, 0.0, None),
            goal(3, GoalPriority::High, 1000.0, 0.0, Some(date(2024, 12, 1))),
            goal(4, GoalPriority::High, 1000.0, 0.0, Some(date(2026, 1, 1))),
        ];
        let alloc = allocate(&goals, 5000.0, today());
        assert_eq!(alloc.len(), 1);
        assert_eq!(alloc[0].goal_id, 4);
        assert!((alloc[0].recommended_allocation - 100.0).abs() < 1e-9);
    }

    #[test]
    fn allocation_empty_when_no_active_goals() {
        assert!(allocate(&[], 5000.0, today()).is_empty());
    }

    #[test]
    fn allocation_percentages_sum_to_hundred() {
        let priorities = [
            GoalPriority::Critical,
            GoalPriority::High,
            GoalPriority::Medium,
            GoalPriority::Low,
            GoalPriority::Optional,
        ];
        for income in [0.0, 800.0, 3500.0, 12_000.0] {
            for n in 1..=7 {
                let goals: Vec<GoalSnapshot> = (0..n)
                    .map(|i| {
                        goal(
                            i,
                            priorities[(i as usize * 3) % 5],
                            500.0 + 1750.0 * i as f64,
                            100.0 * i as f64,
                            Some(today() + chrono::Duration::days(45 + 60 * i)),
                        )
                    })
                    .collect();
                let total: f64 = allocate(&goals, income, today())
                    .iter()
                    .map(|a| a.recommended_allocation)
                    .sum();
                assert!((total - 100.0).abs() < 1e-6, "income {income}, n {n}: {total}");
            }
        }
    }

    #[test]
    fn critical_never_weighs_less_than_optional_at_full_feasibility() {
        assert!(goal_weight(GoalPriority::Critical, 1.0) >= goal_weight(GoalPriority::Optional, 1.0));
    }

    #[test]
    fn infeasible_goal_still_gets_floor_weight() {
        assert!((goal_weight(GoalPriority::Optional, 0.0) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn suggested_amounts_split_affordable_budget() {
        let goals = vec![
            goal(1, GoalPriority::Critical, 1200.0, 0.0, Some(date(2026, 1, 1))),
            goal(2, GoalPriority::Medium, 1200.0, 0.0, Some(date(2026, 1, 1))),
        ];
        let alloc = allocate(&goals, 10_000.0, today());
        assert_eq!(alloc[0].suggested_monthly_amount, 1875.0);
        assert_eq!(alloc[1].suggested_monthly_amount, 1125.0);
    }

    // -- Recommendations --

    fn infeasible_goal(priority: GoalPriority) -> GoalSnapshot {
        goal(7, priority, 12_000.0, 0.0, Some(date(2025, 7, 1)))
    }

    #[test]
    fn infeasible_goal_gets_amount_and_deadline() {
        let recs = generate_recommendations(&[infeasible_goal(GoalPriority::High)], 1000.0, today());
        let kinds: Vec<RecommendationKind> = recs.iter().map(|r| r.kind).collect();
        assert!(kinds.contains(&RecommendationKind::Amount));
        assert!(kinds.contains(&RecommendationKind::Deadline));
        assert!(!kinds.contains(&RecommendationKind::Priority));

        let deadline = recs
            .iter()
            .find(|r| r.kind == RecommendationKind::Deadline)
            .unwrap();
        assert_eq!(deadline.suggested_target_date, Some(date(2025, 10, 1)));
    }

    #[test]
    fn low_priority_infeasible_goal_gets_priority_raise() {
        let recs = generate_recommendations(&[infeasible_goal(GoalPriority::Optional)], 1000.0, today());
        let rec = recs
            .iter()
            .find(|r| r.kind == RecommendationKind::Priority)
            .expect("priority recommendation");
        assert_eq!(rec.suggested_priority, Some(GoalPriority::Low));
    }

    #[test]
    fn expensive_goal_gets_savings_rate_recommendation() {
        let recs = generate_recommendations(&[infeasible_goal(GoalPriority::Medium)], 1000.0, today());
        let rec = recs
            .iter()
            .find(|r| r.kind == RecommendationKind::SavingsRate)
            .expect("savings rate recommendation");
        assert!(rec.suggested_monthly_amount.unwrap() > max_affordable(1000.0));
    }

    #[test]
    fn feasible_goals_never_get_amount_recommendation() {
        let goals: Vec<GoalSnapshot> = (1..=20)
            .map(|i| {
                goal(
                    i,
                    GoalPriority::from_level((i % 5 + 1) as i16).unwrap(),
                    400.0 * i as f64,
                    0.0,
                    Some(today() + chrono::Duration::days(30 * i)),
                )
            })
            .collect();
        for income in [500.0, 1500.0, 4000.0] {
            for rec in generate_recommendations(&goals, income, today()) {
                if rec.kind == RecommendationKind::Amount {
                    let g = goals.iter().find(|g| g.id == rec.goal_id).unwrap();
                    assert!(calculate_feasibility(g, income, today()) < LOW_FEASIBILITY_THRESHOLD);
                }
            }
        }
    }

    #[test]
    fn comfortable_goal_has_no_recommendations() {
        let g = goal(1, GoalPriority::Low, 1200.0, 0.0, Some(date(2026, 1, 1)));
        assert!(generate_recommendations(&[g], 10_000.0, today()).is_empty());
    }

    // -- On-track ratio --

    #[test]
    fn on_track_ratio_counts_feasible_active_goals() {
        let goals = vec![
            goal(1, GoalPriority::High, 1200.0, 0.0, Some(date(2026, 1, 1))),
            infeasible_goal(GoalPriority::High),
        ];
        assert_eq!(on_track_ratio(&goals, 1000.0, today()), Some(0.5));
        assert_eq!(on_track_ratio(&[], 1000.0, today()), None);
    }
}
