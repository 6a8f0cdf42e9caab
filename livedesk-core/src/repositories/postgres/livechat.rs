// src/repositories/postgres/livechat.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};

use livedesk_common::models::{
    TranscriptMessage, VisitorEvent, VisitorFilter, VisitorRecord, VisitorSession,
};
use livedesk_common::traits::LivechatRepository;

use crate::Error;

pub struct PostgresLivechatRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresLivechatRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_record(r: &PgRow) -> Result<VisitorRecord, Error> {
    let metadata: Json<serde_json::Map<String, serde_json::Value>> = r.try_get("user_metadata")?;
    let sessions: Json<Vec<VisitorSession>> = r.try_get("sessions")?;
    let messages: Json<Vec<TranscriptMessage>> = r.try_get("messages")?;
    let events: Json<Vec<VisitorEvent>> = r.try_get("events")?;

    Ok(VisitorRecord {
        visitor_id: r.try_get("visitor_id")?,
        created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: r.try_get::<DateTime<Utc>, _>("updated_at")?,
        enabled: r.try_get("enabled")?,
        online: r.try_get("online")?,
        visible: r.try_get("visible")?,
        user_metadata: metadata.0,
        sessions: sessions.0,
        messages: messages.0,
        events: events.0,
        version: r.try_get("version")?,
    })
}

#[async_trait]
impl LivechatRepository for PostgresLivechatRepository {
    async fn get(&self, visitor_id: &str) -> Result<Option<VisitorRecord>, Error> {
        let row = sqlx::query(
            r#"
            SELECT visitor_id, enabled, online, visible,
                   user_metadata, sessions, messages, events,
                   version, created_at, updated_at
            FROM livechats
            WHERE visitor_id = $1
            "#,
        )
            .bind(visitor_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn insert(&self, record: &VisitorRecord) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO livechats (
                visitor_id, enabled, online, visible,
                user_metadata, sessions, messages, events,
                version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (visitor_id) DO NOTHING
            "#,
        )
            .bind(&record.visitor_id)
            .bind(record.enabled)
            .bind(record.online)
            .bind(record.visible)
            .bind(Json(&record.user_metadata))
            .bind(Json(&record.sessions))
            .bind(Json(&record.messages))
            .bind(Json(&record.events))
            .bind(record.version)
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn replace(&self, record: &VisitorRecord, expected_version: i64) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE livechats
            SET enabled = $1,
                online = $2,
                visible = $3,
                user_metadata = $4,
                sessions = $5,
                messages = $6,
                events = $7,
                version = $8,
                updated_at = $9
            WHERE visitor_id = $10
              AND version = $11
            "#,
        )
            .bind(record.enabled)
            .bind(record.online)
            .bind(record.visible)
            .bind(Json(&record.user_metadata))
            .bind(Json(&record.sessions))
            .bind(Json(&record.messages))
            .bind(Json(&record.events))
            .bind(record.version)
            .bind(record.updated_at)
            .bind(&record.visitor_id)
            .bind(expected_version)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list(&self, filter: &VisitorFilter) -> Result<Vec<VisitorRecord>, Error> {
        let window = filter.session_window.filter(|w| w.is_bounded());
        let from_ms = window.and_then(|w| w.from).map(|t| t.timestamp_millis());
        let to_ms = window.and_then(|w| w.to).map(|t| t.timestamp_millis());

        let rows = sqlx::query(
            r#"
            SELECT visitor_id, enabled, online, visible,
                   user_metadata, sessions, messages, events,
                   version, created_at, updated_at
            FROM livechats
            WHERE ($1::BOOLEAN IS NULL OR enabled = $1)
              AND ($2::BOOLEAN IS NULL OR online = $2)
              AND ($3::BOOLEAN IS NULL OR visible = $3)
              AND ($4::TEXT IS NULL
                   OR (CASE
                           WHEN user_metadata->>'lifecycle_stage' IN ('lead', 'unqualified')
                               THEN user_metadata->>'lifecycle_stage'
                           ELSE 'subscriber'
                       END) = $4)
              AND (($5::BIGINT IS NULL AND $6::BIGINT IS NULL)
                   OR jsonb_path_exists(
                        sessions,
                        '$[*] ? (@.start_ts >= $from && @.start_ts < $to)',
                        jsonb_build_object(
                            'from', COALESCE($5, 0),
                            'to', COALESCE($6, 9223372036854775807)
                        )
                   ))
            ORDER BY created_at DESC
            "#,
        )
            .bind(filter.enabled)
            .bind(filter.online)
            .bind(filter.visible)
            .bind(filter.lifecycle_stage.map(|s| s.as_str()))
            .bind(from_ms)
            .bind(to_ms)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_record).collect()
    }
}
