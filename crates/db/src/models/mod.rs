//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts, where the API accepts one
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! Clearable update fields are `Option<Option<T>>`: absent leaves the column
//! alone, `null` clears it. They need [`nullable`] because plain serde folds
//! `null` into the outer `None`.

use serde::{Deserialize, Deserializer};

pub mod achievement;
pub mod activity;
pub mod contribution;
pub mod expense;
pub mod goal;
pub mod notification;
pub mod partnership;
pub mod safety_pot;

/// Deserialize a present field (including `null`) as `Some(..)`.
///
/// Use with `#[serde(default, deserialize_with = "nullable")]` so a missing
/// field still defaults to `None`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
