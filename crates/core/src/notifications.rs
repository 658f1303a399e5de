//! Notification kinds and message builders.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::achievements::AchievementKind;
use crate::goal_prioritization::GoalSnapshot;
use crate::types::DbId;

/// Days before a deadline at which reminders start.
pub const DEFAULT_REMINDER_WINDOW_DAYS: i64 = 14;
/// Largest reminder window a caller may request.
pub const MAX_REMINDER_WINDOW_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    GoalDeadlineApproaching,
    GoalReached,
    AchievementUnlocked,
    PartnerExpenseAdded,
    PartnerJoined,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GoalDeadlineApproaching => "goal_deadline_approaching",
            Self::GoalReached => "goal_reached",
            Self::AchievementUnlocked => "achievement_unlocked",
            Self::PartnerExpenseAdded => "partner_expense_added",
            Self::PartnerJoined => "partner_joined",
        }
    }
}

/// A notification ready to be inserted for one or more users.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub entity_type: Option<&'static str>,
    pub entity_id: Option<DbId>,
}

pub fn goal_deadline(goal: &GoalSnapshot, days_left: i64) -> NotificationDraft {
    let when = match days_left {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n => format!("in {n} days"),
    };
    NotificationDraft {
        kind: NotificationKind::GoalDeadlineApproaching,
        title: format!("\"{}\" is due {when}", goal.name),
        body: format!(
            "{:.2} still to go to reach {:.2}.",
            goal.remaining(),
            goal.target_amount
        ),
        entity_type: Some("goal"),
        entity_id: Some(goal.id),
    }
}

pub fn goal_reached(goal_id: DbId, name: &str, target_amount: f64) -> NotificationDraft {
    NotificationDraft {
        kind: NotificationKind::GoalReached,
        title: format!("\"{name}\" is fully funded!"),
        body: format!("You reached your target of {target_amount:.2}. Time to celebrate."),
        entity_type: Some("goal"),
        entity_id: Some(goal_id),
    }
}

pub fn achievement_unlocked(kind: AchievementKind, achievement_id: DbId) -> NotificationDraft {
    NotificationDraft {
        kind: NotificationKind::AchievementUnlocked,
        title: format!("Achievement unlocked: {}", kind.title()),
        body: format!("{} (+{} points)", kind.description(), kind.points()),
        entity_type: Some("achievement"),
        entity_id: Some(achievement_id),
    }
}

pub fn partner_expense(expense_id: DbId, description: &str, amount: f64, your_share: f64) -> NotificationDraft {
    NotificationDraft {
        kind: NotificationKind::PartnerExpenseAdded,
        title: "Your partner added an expense".to_string(),
        body: format!("\"{description}\" for {amount:.2}. Your share is {your_share:.2}."),
        entity_type: Some("expense"),
        entity_id: Some(expense_id),
    }
}

pub fn partner_joined(partnership_id: DbId, partnership_name: &str) -> NotificationDraft {
    NotificationDraft {
        kind: NotificationKind::PartnerJoined,
        title: "Your partner joined".to_string(),
        body: format!("\"{partnership_name}\" is now shared between the two of you."),
        entity_type: Some("partnership"),
        entity_id: Some(partnership_id),
    }
}

/// Reminders for unfunded goals due within `window_days` of `today`
/// (inclusive), soonest first.
pub fn deadline_reminders(goals: &[GoalSnapshot], today: NaiveDate, window_days: i64) -> Vec<NotificationDraft> {
    let mut due: Vec<(i64, &GoalSnapshot)> = goals
        .iter()
        .filter(|g| !g.is_funded())
        .filter_map(|g| {
            let days_left = (g.target_date? - today).num_days();
            (0..=window_days).contains(&days_left).then_some((days_left, g))
        })
        .collect();
    due.sort_by_key(|(days, g)| (*days, g.id));
    due.into_iter()
        .map(|(days, g)| goal_deadline(g, days))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal_prioritization::GoalPriority;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn goal(id: DbId, current: f64, days_out: Option<i64>) -> GoalSnapshot {
        GoalSnapshot {
            id,
            name: format!("Goal {id}"),
            target_amount: 1000.0,
            current_amount: current,
            target_date: days_out.map(|d| today() + chrono::Duration::days(d)),
            priority: GoalPriority::Medium,
        }
    }

    #[test]
    fn reminders_only_inside_window() {
        let goals = vec![
            goal(1, 0.0, Some(20)),
            goal(2, 0.0, Some(3)),
            goal(3, 0.0, Some(0)),
            goal(4, 0.0, Some(-1)),
            goal(5, 0.0, None),
        ];
        let reminders = deadline_reminders(&goals, today(), DEFAULT_REMINDER_WINDOW_DAYS);
        let ids: Vec<Option<DbId>> = reminders.iter().map(|r| r.entity_id).collect();
        assert_eq!(ids, vec![Some(3), Some(2)]);
        assert_eq!(reminders[0].title, "\"Goal 3\" is due today");
        assert_eq!(reminders[1].title, "\"Goal 2\" is due in 3 days");
    }

    #[test]
    fn funded_goals_get_no_reminder() {
        let goals = vec![goal(1, 1000.0, Some(2))];
        assert!(deadline_reminders(&goals, today(), 14).is_empty());
    }

    #[test]
    fn deadline_body_mentions_remaining() {
        let draft = goal_deadline(&goal(9, 250.0, Some(1)), 1);
        assert_eq!(draft.title, "\"Goal 9\" is due tomorrow");
        assert_eq!(draft.body, "750.00 still to go to reach 1000.00.");
    }

    #[test]
    fn achievement_message_uses_catalog_text() {
        let draft = achievement_unlocked(AchievementKind::Streak7, 3);
        assert_eq!(draft.title, "Achievement unlocked: Week Warrior");
        assert!(draft.body.contains("+25 points"));
        assert_eq!(draft.kind.as_str(), "achievement_unlocked");
    }

    #[test]
    fn partner_expense_mentions_share() {
        let draft = partner_expense(4, "Dinner", 80.0, 32.0);
        assert_eq!(draft.body, "\"Dinner\" for 80.00. Your share is 32.00.");
    }
}
