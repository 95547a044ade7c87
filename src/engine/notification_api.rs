use super::helpers::decode_all;
use super::Engine;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::NotificationAPI,
    auth::{Platform, User},
    entities::Notification,
    error::{not_found_error, Error},
};

#[async_trait]
impl NotificationAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn list_notifications(
        &self,
        user: User,
        unread_only: bool,
    ) -> Result<Vec<Notification>, Error> {
        self.authorize(user.clone(), "list_own", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query("SELECT data FROM notifications WHERE recipient_id = $1 AND (NOT $2 OR NOT is_read) ORDER BY sent_at DESC")
                    .bind(&user.id)
                    .bind(unread_only),
            )
            .await?;

        decode_all(&rows)
    }

    #[tracing::instrument(skip(self))]
    async fn mark_notification_read(&self, user: User, id: Uuid) -> Result<Notification, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let Json(mut notification): Json<Notification> = tx
            .fetch_optional(
                sqlx::query("SELECT data FROM notifications WHERE id = $1 FOR UPDATE").bind(&id),
            )
            .await?
            .ok_or_else(|| not_found_error().with_message("notification not found"))?
            .try_get("data")?;

        self.authorize(user.clone(), "mark_read", notification.clone())?;

        notification.mark_read();

        tx.execute(
            sqlx::query("UPDATE notifications SET is_read = $2, data = $3 WHERE id = $1")
                .bind(&notification.id)
                .bind(notification.is_read)
                .bind(Json(&notification)),
        )
        .await?;

        tx.commit().await?;

        Ok(notification)
    }

    #[tracing::instrument(skip(self))]
    async fn mark_all_notifications_read(&self, user: User) -> Result<u64, Error> {
        self.authorize(user.clone(), "list_own", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let result = conn
            .execute(
                sqlx::query("UPDATE notifications SET is_read = TRUE, data = jsonb_set(data, '{is_read}', 'true') WHERE recipient_id = $1 AND NOT is_read")
                    .bind(&user.id),
            )
            .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self))]
    async fn purge_read_notifications(
        &self,
        user: User,
        older_than: DateTime<Utc>,
    ) -> Result<u64, Error> {
        self.authorize(user.clone(), "sweep", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let result = conn
            .execute(
                sqlx::query("DELETE FROM notifications WHERE is_read AND sent_at < $1")
                    .bind(older_than),
            )
            .await?;

        if result.rows_affected() > 0 {
            tracing::info!(count = result.rows_affected(), "purged read notifications");
        }

        Ok(result.rows_affected())
    }
}
