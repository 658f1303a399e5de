//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod achievement_repo;
pub mod activity_repo;
pub mod contribution_repo;
pub mod expense_repo;
pub mod goal_repo;
pub mod notification_repo;
pub mod partnership_repo;
pub mod safety_pot_repo;

pub use achievement_repo::AchievementRepo;
pub use activity_repo::ActivityRepo;
pub use contribution_repo::ContributionRepo;
pub use expense_repo::ExpenseRepo;
pub use goal_repo::GoalRepo;
pub use notification_repo::NotificationRepo;
pub use partnership_repo::PartnershipRepo;
pub use safety_pot_repo::SafetyPotRepo;
