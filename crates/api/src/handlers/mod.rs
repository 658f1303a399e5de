pub mod access;
pub mod achievement;
pub mod activity;
pub mod analytics;
pub mod contribution;
pub mod expense;
pub mod goal;
pub mod notification;
pub mod partnership;
pub mod safety_pot;
pub mod snapshot;
