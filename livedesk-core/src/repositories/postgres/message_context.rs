// src/repositories/postgres/message_context.rs

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};

use livedesk_common::models::MessageContext;
use livedesk_common::traits::MessageContextRepository;

use crate::Error;

pub struct PostgresMessageContextRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresMessageContextRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageContextRepository for PostgresMessageContextRepository {
    async fn put(&self, message_id: &str, context: &MessageContext) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO message_contexts (message_id, context, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (message_id)
            DO UPDATE SET context = EXCLUDED.context,
                          updated_at = NOW()
            "#,
        )
            .bind(message_id)
            .bind(Json(context))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, message_id: &str) -> Result<Option<MessageContext>, Error> {
        let row = sqlx::query(
            r#"
            SELECT context
            FROM message_contexts
            WHERE message_id = $1
            "#,
        )
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(r) = row {
            let context: Json<MessageContext> = r.try_get("context")?;
            Ok(Some(context.0))
        } else {
            Ok(None)
        }
    }
}
