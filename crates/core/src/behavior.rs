//! Contribution behavior analysis.
//!
//! Learns a partnership's saving habits from its contribution history:
//! average size, spread, month-over-month trend and consistency. Insights
//! are reason codes mapped to fixed advice.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::forecasting::RiskLevel;
use crate::money::round_cents;
use crate::stats;

/// Contributions needed before any pattern is reported.
pub const MIN_CONTRIBUTIONS_FOR_ANALYSIS: usize = 3;
/// Relative change between halves of the history that counts as a trend.
pub const TREND_BAND: f64 = 0.10;
/// Coefficient of variation above which contributions count as irregular.
pub const IRREGULAR_CV: f64 = 0.5;
/// Consistency score at or above which a saver counts as consistent.
pub const CONSISTENT_SCORE: f64 = 0.8;
/// Consistency score needed alongside an upward trend for "momentum".
pub const MOMENTUM_SCORE: f64 = 0.7;
/// Uplift applied to the recommended contribution when no target is set.
pub const DEFAULT_UPLIFT: f64 = 1.05;
/// Uplift applied when contributions are declining.
pub const RECOVERY_UPLIFT: f64 = 1.10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionPoint {
    pub amount: f64,
    pub contributed_on: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Stable,
    Decreasing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorReason {
    InsufficientData,
    IrregularContributions,
    DecliningContributions,
    BelowTarget,
    StrongMomentum,
    ConsistentSaver,
}

impl BehaviorReason {
    pub fn message(self) -> &'static str {
        match self {
            Self::InsufficientData => {
                "Add a few more contributions so we can learn your saving pattern."
            }
            Self::IrregularContributions => {
                "Your contributions vary a lot. A fixed recurring amount makes goals easier to hit."
            }
            Self::DecliningContributions => {
                "Recent contributions are smaller than earlier ones. Check whether a new expense crept in."
            }
            Self::BelowTarget => {
                "You are contributing less each month than your target. Small top-ups close the gap."
            }
            Self::StrongMomentum => {
                "Contributions are growing steadily. Consider raising a goal's priority to use the momentum."
            }
            Self::ConsistentSaver => "You save consistently. Keep it up!",
        }
    }

    /// Whether the reason signals a problem.
    pub fn is_concern(self) -> bool {
        matches!(
            self,
            Self::IrregularContributions | Self::DecliningContributions | Self::BelowTarget
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BehaviorInsight {
    pub reason: BehaviorReason,
    pub message: &'static str,
}

impl From<BehaviorReason> for BehaviorInsight {
    fn from(reason: BehaviorReason) -> Self {
        Self {
            reason,
            message: reason.message(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BehaviorAnalysis {
    pub contribution_count: usize,
    pub total_contributed: f64,
    pub average_contribution: f64,
    pub contribution_variance: f64,
    /// `1 - min(cv, 1)`; 1.0 means every contribution was the same size.
    pub consistency_score: f64,
    pub active_months: usize,
    pub contributions_per_month: f64,
    pub average_monthly_total: f64,
    pub trend: Trend,
    pub risk_level: RiskLevel,
    pub recommended_monthly_contribution: f64,
    pub insights: Vec<BehaviorInsight>,
}

/// Compare the mean of the older half with the newer half.
pub fn detect_trend(amounts_by_date: &[f64]) -> Trend {
    if amounts_by_date.len() < 2 {
        return Trend::Stable;
    }
    let (older, newer) = amounts_by_date.split_at(amounts_by_date.len() / 2);
    let before = stats::mean(older);
    let after = stats::mean(newer);
    if before <= 0.0 {
        return if after > 0.0 { Trend::Increasing } else { Trend::Stable };
    }
    let change = (after - before) / before;
    if change > TREND_BAND {
        Trend::Increasing
    } else if change < -TREND_BAND {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Sum contributions per calendar month, oldest first.
pub fn monthly_totals(points: &[ContributionPoint]) -> Vec<(NaiveDate, f64)> {
    let mut by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for p in points {
        *by_month
            .entry((p.contributed_on.year(), p.contributed_on.month()))
            .or_default() += p.amount;
    }
    by_month
        .into_iter()
        .filter_map(|((y, m), total)| NaiveDate::from_ymd_opt(y, m, 1).map(|d| (d, total)))
        .collect()
}

/// Analyze a contribution history against an optional monthly target.
pub fn analyze(points: &[ContributionPoint], monthly_target: Option<f64>) -> BehaviorAnalysis {
    let mut sorted: Vec<&ContributionPoint> = points.iter().collect();
    sorted.sort_by_key(|p| p.contributed_on);
    let amounts: Vec<f64> = sorted.iter().map(|p| p.amount).collect();

    let months = monthly_totals(points);
    let month_values: Vec<f64> = months.iter().map(|(_, total)| *total).collect();
    let average_monthly_total = stats::mean(&month_values);
    let total_contributed: f64 = amounts.iter().sum();

    if amounts.len() < MIN_CONTRIBUTIONS_FOR_ANALYSIS {
        return BehaviorAnalysis {
            contribution_count: amounts.len(),
            total_contributed: round_cents(total_contributed),
            average_contribution: round_cents(stats::mean(&amounts)),
            contribution_variance: 0.0,
            consistency_score: 0.0,
            active_months: months.len(),
            contributions_per_month: 0.0,
            average_monthly_total: round_cents(average_monthly_total),
            trend: Trend::Stable,
            risk_level: RiskLevel::Medium,
            recommended_monthly_contribution: round_cents(
                monthly_target.unwrap_or(average_monthly_total),
            ),
            insights: vec![BehaviorReason::InsufficientData.into()],
        };
    }

    let cv = stats::coefficient_of_variation(&amounts);
    let consistency_score = 1.0 - cv.min(1.0);
    let trend = detect_trend(&amounts);

    let mut reasons = Vec::new();
    if cv > IRREGULAR_CV {
        reasons.push(BehaviorReason::IrregularContributions);
    }
    if trend == Trend::Decreasing {
        reasons.push(BehaviorReason::DecliningContributions);
    }
    if matches!(monthly_target, Some(target) if average_monthly_total < target) {
        reasons.push(BehaviorReason::BelowTarget);
    }
    if trend == Trend::Increasing && consistency_score >= MOMENTUM_SCORE {
        reasons.push(BehaviorReason::StrongMomentum);
    }

    let concerns = reasons.iter().filter(|r| r.is_concern()).count();
    if concerns == 0 && consistency_score >= CONSISTENT_SCORE {
        reasons.push(BehaviorReason::ConsistentSaver);
    }

    let risk_level = match concerns {
        0 => RiskLevel::Low,
        1 => RiskLevel::Medium,
        _ => RiskLevel::High,
    };

    let recommended = match monthly_target {
        Some(target) => target.max(average_monthly_total),
        None if trend == Trend::Decreasing => average_monthly_total * RECOVERY_UPLIFT,
        None => average_monthly_total * DEFAULT_UPLIFT,
    };

    BehaviorAnalysis {
        contribution_count: amounts.len(),
        total_contributed: round_cents(total_contributed),
        average_contribution: round_cents(stats::mean(&amounts)),
        contribution_variance: round_cents(stats::population_variance(&amounts)),
        consistency_score,
        active_months: months.len(),
        contributions_per_month: amounts.len() as f64 / months.len().max(1) as f64,
        average_monthly_total: round_cents(average_monthly_total),
        trend,
        risk_level,
        recommended_monthly_contribution: round_cents(recommended),
        insights: reasons.into_iter().map(BehaviorInsight::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(amount: f64, y: i32, m: u32, d: u32) -> ContributionPoint {
        ContributionPoint {
            amount,
            contributed_on: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        }
    }

    fn reasons(analysis: &BehaviorAnalysis) -> Vec<BehaviorReason> {
        analysis.insights.iter().map(|i| i.reason).collect()
    }

    #[test]
    fn too_few_contributions_reports_insufficient_data() {
        let analysis = analyze(&[point(100.0, 2025, 1, 1)], Some(250.0));
        assert_eq!(reasons(&analysis), vec![BehaviorReason::InsufficientData]);
        assert_eq!(analysis.risk_level, RiskLevel::Medium);
        assert_eq!(analysis.recommended_monthly_contribution, 250.0);
    }

    #[test]
    fn empty_history_is_insufficient() {
        let analysis = analyze(&[], None);
        assert_eq!(analysis.contribution_count, 0);
        assert_eq!(reasons(&analysis), vec![BehaviorReason::InsufficientData]);
    }

    #[test]
    fn steady_saver_is_low_risk() {
        let points = vec![
            point(200.0, 2025, 1, 5),
            point(200.0, 2025, 2, 5),
            point(200.0, 2025, 3, 5),
            point(200.0, 2025, 4, 5),
        ];
        let analysis = analyze(&points, Some(200.0));
        assert_eq!(analysis.consistency_score, 1.0);
        assert_eq!(analysis.trend, Trend::Stable);
        assert_eq!(analysis.risk_level, RiskLevel::Low);
        assert_eq!(reasons(&analysis), vec![BehaviorReason::ConsistentSaver]);
        assert_eq!(analysis.contributions_per_month, 1.0);
    }

    #[test]
    fn declining_contributions_are_flagged() {
        let points = vec![
            point(400.0, 2025, 1, 1),
            point(380.0, 2025, 2, 1),
            point(150.0, 2025, 3, 1),
            point(120.0, 2025, 4, 1),
        ];
        let analysis = analyze(&points, None);
        assert_eq!(analysis.trend, Trend::Decreasing);
        assert!(reasons(&analysis).contains(&BehaviorReason::DecliningContributions));
        let expected = round_cents(analysis.average_monthly_total * RECOVERY_UPLIFT);
        assert_eq!(analysis.recommended_monthly_contribution, expected);
    }

    #[test]
    fn erratic_and_below_target_is_high_risk() {
        let points = vec![
            point(500.0, 2025, 1, 1),
            point(10.0, 2025, 2, 1),
            point(20.0, 2025, 3, 1),
            point(15.0, 2025, 4, 1),
        ];
        let analysis = analyze(&points, Some(400.0));
        let found = reasons(&analysis);
        assert!(found.contains(&BehaviorReason::IrregularContributions));
        assert!(found.contains(&BehaviorReason::BelowTarget));
        assert_eq!(analysis.risk_level, RiskLevel::High);
        assert_eq!(analysis.recommended_monthly_contribution, 400.0);
    }

    #[test]
    fn rising_steady_contributions_show_momentum() {
        let points = vec![
            point(100.0, 2025, 1, 1),
            point(110.0, 2025, 2, 1),
            point(130.0, 2025, 3, 1),
            point(140.0, 2025, 4, 1),
        ];
        let analysis = analyze(&points, None);
        assert_eq!(analysis.trend, Trend::Increasing);
        assert!(reasons(&analysis).contains(&BehaviorReason::StrongMomentum));
    }

    #[test]
    fn input_order_does_not_matter() {
        let points = vec![
            point(120.0, 2025, 4, 1),
            point(400.0, 2025, 1, 1),
            point(150.0, 2025, 3, 1),
            point(380.0, 2025, 2, 1),
        ];
        assert_eq!(analyze(&points, None).trend, Trend::Decreasing);
    }

    #[test]
    fn monthly_totals_group_by_calendar_month() {
        let points = vec![
            point(50.0, 2025, 1, 3),
            point(25.0, 2025, 1, 28),
            point(10.0, 2025, 2, 1),
        ];
        let totals = monthly_totals(&points);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0], (NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 75.0));
        assert_eq!(totals[1].1, 10.0);
    }

    #[test]
    fn trend_from_zero_baseline() {
        assert_eq!(detect_trend(&[0.0, 0.0, 5.0, 5.0]), Trend::Increasing);
        assert_eq!(detect_trend(&[0.0, 0.0]), Trend::Stable);
        assert_eq!(detect_trend(&[42.0]), Trend::Stable);
    }
}
