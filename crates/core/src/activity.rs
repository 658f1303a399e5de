//! Activity feed vocabulary.
//!
//! Every mutation a partner makes is logged as an activity row. The type is
//! stored as its string form; details are free-form JSON used to render a
//! one-line description.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    PartnershipCreated,
    PartnerJoined,
    PartnershipUpdated,
    ExpenseAdded,
    ExpenseUpdated,
    ExpenseDeleted,
    GoalCreated,
    GoalUpdated,
    GoalDeleted,
    GoalCompleted,
    ContributionAdded,
    SafetyPotDeposit,
    SafetyPotWithdrawal,
    AchievementUnlocked,
}

impl ActivityType {
    pub const ALL: [ActivityType; 14] = [
        Self::PartnershipCreated,
        Self::PartnerJoined,
        Self::PartnershipUpdated,
        Self::ExpenseAdded,
        Self::ExpenseUpdated,
        Self::ExpenseDeleted,
        Self::GoalCreated,
        Self::GoalUpdated,
        Self::GoalDeleted,
        Self::GoalCompleted,
        Self::ContributionAdded,
        Self::SafetyPotDeposit,
        Self::SafetyPotWithdrawal,
        Self::AchievementUnlocked,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PartnershipCreated => "partnership_created",
            Self::PartnerJoined => "partner_joined",
            Self::PartnershipUpdated => "partnership_updated",
            Self::ExpenseAdded => "expense_added",
            Self::ExpenseUpdated => "expense_updated",
            Self::ExpenseDeleted => "expense_deleted",
            Self::GoalCreated => "goal_created",
            Self::GoalUpdated => "goal_updated",
            Self::GoalDeleted => "goal_deleted",
            Self::GoalCompleted => "goal_completed",
            Self::ContributionAdded => "contribution_added",
            Self::SafetyPotDeposit => "safety_pot_deposit",
            Self::SafetyPotWithdrawal => "safety_pot_withdrawal",
            Self::AchievementUnlocked => "achievement_unlocked",
        }
    }

    /// The entity table the activity refers to.
    pub fn entity_type(self) -> &'static str {
        match self {
            Self::PartnershipCreated | Self::PartnerJoined | Self::PartnershipUpdated => {
                "partnership"
            }
            Self::ExpenseAdded | Self::ExpenseUpdated | Self::ExpenseDeleted => "expense",
            Self::GoalCreated | Self::GoalUpdated | Self::GoalDeleted | Self::GoalCompleted => {
                "goal"
            }
            Self::ContributionAdded => "contribution",
            Self::SafetyPotDeposit | Self::SafetyPotWithdrawal => "safety_pot",
            Self::AchievementUnlocked => "achievement",
        }
    }

    /// Render a feed line from the stored details.
    ///
    /// Missing detail fields degrade to generic wording rather than failing.
    pub fn describe(self, details: Option<&Value>) -> String {
        let text = |key: &str| {
            details
                .and_then(|d| d.get(key))
                .and_then(Value::as_str)
                .map(str::to_owned)
        };
        let amount = || {
            details
                .and_then(|d| d.get("amount"))
                .and_then(Value::as_f64)
                .map(|a| format!("{a:.2}"))
        };

        match self {
            Self::PartnershipCreated => "Created the partnership".to_string(),
            Self::PartnerJoined => "Joined the partnership".to_string(),
            Self::PartnershipUpdated => "Updated partnership settings".to_string(),
            Self::ExpenseAdded => match (text("description"), amount()) {
                (Some(d), Some(a)) => format!("Added expense \"{d}\" ({a})"),
                _ => "Added an expense".to_string(),
            },
            Self::ExpenseUpdated => match text("description") {
                Some(d) => format!("Updated expense \"{d}\""),
                None => "Updated an expense".to_string(),
            },
            Self::ExpenseDeleted => "Deleted an expense".to_string(),
            Self::GoalCreated => match text("name") {
                Some(n) => format!("Created goal \"{n}\""),
                None => "Created a goal".to_string(),
            },
            Self::GoalUpdated => match text("name") {
                Some(n) => format!("Updated goal \"{n}\""),
                None => "Updated a goal".to_string(),
            },
            Self::GoalDeleted => "Deleted a goal".to_string(),
            Self::GoalCompleted => match text("name") {
                Some(n) => format!("Completed goal \"{n}\""),
                None => "Completed a goal".to_string(),
            },
            Self::ContributionAdded => match (amount(), text("goal_name")) {
                (Some(a), Some(g)) => format!("Contributed {a} to \"{g}\""),
                (Some(a), None) => format!("Contributed {a}"),
                _ => "Made a contribution".to_string(),
            },
            Self::SafetyPotDeposit => match amount() {
                Some(a) => format!("Added {a} to the safety pot"),
                None => "Added to the safety pot".to_string(),
            },
            Self::SafetyPotWithdrawal => match amount() {
                Some(a) => format!("Withdrew {a} from the safety pot"),
                None => "Withdrew from the safety pot".to_string(),
            },
            Self::AchievementUnlocked => match text("title") {
                Some(t) => format!("Unlocked \"{t}\""),
                None => "Unlocked an achievement".to_string(),
            },
        }
    }
}

impl FromStr for ActivityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown activity type: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_type_round_trips_through_str() {
        for t in ActivityType::ALL {
            assert_eq!(t.as_str().parse::<ActivityType>().unwrap(), t);
            assert_eq!(serde_json::to_value(t).unwrap(), json!(t.as_str()));
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!("expense_exploded".parse::<ActivityType>().is_err());
    }

    #[test]
    fn describes_expense_with_details() {
        let details = json!({"description": "Groceries", "amount": 42.5});
        assert_eq!(
            ActivityType::ExpenseAdded.describe(Some(&details)),
            "Added expense \"Groceries\" (42.50)"
        );
    }

    #[test]
    fn describe_degrades_without_details() {
        assert_eq!(ActivityType::ExpenseAdded.describe(None), "Added an expense");
        assert_eq!(
            ActivityType::ContributionAdded.describe(Some(&json!({"amount": 10}))),
            "Contributed 10.00"
        );
    }

    #[test]
    fn entity_types_group_related_activities() {
        assert_eq!(ActivityType::GoalCompleted.entity_type(), "goal");
        assert_eq!(ActivityType::SafetyPotWithdrawal.entity_type(), "safety_pot");
    }
}
