//! Pure domain logic for SplitSave.
//!
//! Nothing in this crate performs I/O. Handlers fetch rows through
//! `splitsave-db`, map them into the snapshot types defined here, and call
//! the engines synchronously.

pub mod achievements;
pub mod activity;
pub mod behavior;
pub mod error;
pub mod expense_split;
pub mod forecasting;
pub mod goal_prioritization;
pub mod money;
pub mod notifications;
pub mod pagination;
pub mod safety_pot;
pub mod stats;
pub mod types;
pub mod validation;
