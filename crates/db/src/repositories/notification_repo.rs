//! Repository for the `notifications` table.

use splitsave_core::notifications::NotificationDraft;
use splitsave_core::types::{DbId, UserId};
use sqlx::PgPool;

use crate::models::notification::Notification;

/// Column list for `notifications` queries.
const COLUMNS: &str =
    "id, user_id, kind, title, body, entity_type, entity_id, is_read, read_at, created_at";

/// Provides CRUD operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Deliver a drafted notification to one user.
    ///
    /// Returns `None` when the user already has an unread notification of the
    /// same kind about the same entity. The check is enforced by the
    /// `uq_notifications_unread_subject` partial index, so concurrent callers
    /// cannot both insert.
    pub async fn create(
        pool: &PgPool,
        user_id: UserId,
        draft: &NotificationDraft,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications (user_id, kind, title, body, entity_type, entity_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (user_id, kind, entity_id) WHERE is_read = false DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(draft.kind.as_str())
            .bind(&draft.title)
            .bind(&draft.body)
            .bind(draft.entity_type)
            .bind(draft.entity_id)
            .fetch_optional(pool)
            .await
    }

    /// List notifications for a user.
    ///
    /// When `unread_only` is `true`, only notifications with `is_read = false`
    /// are returned.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: UserId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let filter = if unread_only { "AND is_read = false" } else { "" };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE user_id = $1 {filter}
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark a single notification as read.
    ///
    /// Returns `true` if the notification was found for the given user and updated,
    /// `false` otherwise.
    pub async fn mark_read(pool: &PgPool, notification_id: DbId, user_id: UserId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications
             SET is_read = true, read_at = NOW()
             WHERE id = $1 AND user_id = $2 AND is_read = false",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all unread notifications as read for a user.
    ///
    /// Returns the number of notifications that were marked read.
    pub async fn mark_all_read(pool: &PgPool, user_id: UserId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications
             SET is_read = true, read_at = NOW()
             WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Get the number of unread notifications for a user.
    pub async fn unread_count(pool: &PgPool, user_id: UserId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }
}
