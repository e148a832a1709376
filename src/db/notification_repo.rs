// src/db/notification_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::notification::{Notification, NotificationKind},
};

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_notification<'e, E>(
        &self,
        executor: E,
        studio_id: Option<Uuid>,
        user_id: Option<Uuid>,
        kind: NotificationKind,
        message: &str,
    ) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (studio_id, user_id, kind, message)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
            .bind(studio_id)
            .bind(user_id)
            .bind(kind.as_str())
            .bind(message)
            .fetch_one(executor)
            .await?;
        Ok(notification)
    }

    // Mais recentes primeiro
    pub async fn list_notifications(&self, limit: i64) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications ORDER BY created_at DESC LIMIT $1",
        )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(notifications)
    }
}
