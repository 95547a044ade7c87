use super::helpers::decode_all;
use super::{Database, Engine};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{types::Json, Acquire, Executor, Row, Transaction};
use uuid::Uuid;

use crate::{
    api::MessagingAPI,
    auth::{Platform, User},
    entities::{Conversation, ConversationSummary, Message},
    error::{not_found_error, Error},
};

async fn fetch_conversation(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
    for_update: bool,
) -> Result<Conversation, Error> {
    let query = match for_update {
        true => "SELECT data FROM conversations WHERE id = $1 FOR UPDATE",
        false => "SELECT data FROM conversations WHERE id = $1",
    };

    let Json(conversation): Json<Conversation> = tx
        .fetch_optional(sqlx::query(query).bind(id))
        .await?
        .ok_or_else(|| not_found_error().with_message("conversation not found"))?
        .try_get("data")?;

    Ok(conversation)
}

/// Key shared by both orderings of the same pair of users.
fn pair_key(a: &Uuid, b: &Uuid) -> String {
    match a < b {
        true => format!("{}:{}", a, b),
        false => format!("{}:{}", b, a),
    }
}

#[async_trait]
impl MessagingAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn start_conversation(&self, user: User, other: Uuid) -> Result<Conversation, Error> {
        self.authorize(user.clone(), "start_conversation", Platform::default())?;

        let now = Utc::now();
        let conversation = Conversation::new(user.id, other, now)?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        // serializes concurrent attempts to open the same two-party conversation
        tx.execute(
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                .bind(pair_key(&user.id, &other)),
        )
        .await?;

        let query = "
            SELECT
                c.data
            FROM
                conversations c
            WHERE
                (SELECT COUNT(*) FROM conversation_participants p WHERE p.conversation_id = c.id) = 2
                AND EXISTS (SELECT 1 FROM conversation_participants p WHERE p.conversation_id = c.id AND p.user_id = $1)
                AND EXISTS (SELECT 1 FROM conversation_participants p WHERE p.conversation_id = c.id AND p.user_id = $2)
            LIMIT 1
        ";

        let existing = tx
            .fetch_optional(sqlx::query(query).bind(&user.id).bind(&other))
            .await?;

        if let Some(row) = existing {
            let Json(conversation): Json<Conversation> = row.try_get("data")?;
            return Ok(conversation);
        }

        tx.execute(
            sqlx::query("INSERT INTO conversations (id, updated_at, data) VALUES ($1, $2, $3)")
                .bind(&conversation.id)
                .bind(conversation.updated_at)
                .bind(Json(&conversation)),
        )
        .await?;

        for participant_id in conversation.participant_ids.iter() {
            tx.execute(
                sqlx::query("INSERT INTO conversation_participants (conversation_id, user_id) VALUES ($1, $2)")
                    .bind(&conversation.id)
                    .bind(participant_id),
            )
            .await?;
        }

        tx.commit().await?;

        Ok(conversation)
    }

    #[tracing::instrument(skip(self))]
    async fn list_conversations(&self, user: User) -> Result<Vec<ConversationSummary>, Error> {
        self.authorize(user.clone(), "list_own", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let query = "
            SELECT
                c.data,
                (
                    SELECT m.data FROM messages m
                    WHERE m.conversation_id = c.id
                    ORDER BY m.sent_at DESC
                    LIMIT 1
                ) AS last_message,
                (
                    SELECT COUNT(*) FROM messages m
                    WHERE m.conversation_id = c.id AND NOT m.is_read AND m.sender_id <> $1
                ) AS unread_count
            FROM
                conversations c
                JOIN conversation_participants p ON p.conversation_id = c.id AND p.user_id = $1
            ORDER BY
                c.updated_at DESC
        ";

        let rows = conn.fetch_all(sqlx::query(query).bind(&user.id)).await?;

        let mut summaries = Vec::with_capacity(rows.len());

        for row in rows.iter() {
            let Json(conversation): Json<Conversation> = row.try_get("data")?;
            let last_message: Option<Json<Message>> = row.try_get("last_message")?;
            let unread_count: i64 = row.try_get("unread_count")?;

            summaries.push(ConversationSummary {
                conversation,
                last_message: last_message.map(|Json(message)| message),
                unread_count,
            });
        }

        Ok(summaries)
    }

    #[tracing::instrument(skip(self))]
    async fn list_messages(&self, user: User, conversation_id: Uuid) -> Result<Vec<Message>, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let conversation = fetch_conversation(&mut tx, &conversation_id, false).await?;

        self.authorize(user.clone(), "read", conversation.clone())?;

        let rows = tx
            .fetch_all(
                sqlx::query("SELECT data FROM messages WHERE conversation_id = $1 ORDER BY sent_at ASC")
                    .bind(&conversation.id),
            )
            .await?;

        tx.commit().await?;

        decode_all(&rows)
    }

    #[tracing::instrument(skip(self, content))]
    async fn send_message(
        &self,
        user: User,
        conversation_id: Uuid,
        content: String,
    ) -> Result<Message, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;
        let now = Utc::now();

        let mut conversation = fetch_conversation(&mut tx, &conversation_id, true).await?;

        self.authorize(user.clone(), "send_message", conversation.clone())?;

        let message = Message::new(&conversation, user.id, &content, now)?;
        conversation.touch(now);

        tx.execute(
            sqlx::query("INSERT INTO messages (id, conversation_id, sender_id, is_read, sent_at, data) VALUES ($1, $2, $3, $4, $5, $6)")
                .bind(&message.id)
                .bind(&message.conversation_id)
                .bind(&message.sender_id)
                .bind(message.is_read)
                .bind(message.sent_at)
                .bind(Json(&message)),
        )
        .await?;

        tx.execute(
            sqlx::query("UPDATE conversations SET updated_at = $2, data = $3 WHERE id = $1")
                .bind(&conversation.id)
                .bind(conversation.updated_at)
                .bind(Json(&conversation)),
        )
        .await?;

        tx.commit().await?;

        Ok(message)
    }

    #[tracing::instrument(skip(self))]
    async fn mark_conversation_read(&self, user: User, conversation_id: Uuid) -> Result<u64, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let conversation = fetch_conversation(&mut tx, &conversation_id, false).await?;

        self.authorize(user.clone(), "mark_read", conversation.clone())?;

        let result = tx
            .execute(
                sqlx::query("UPDATE messages SET is_read = TRUE, data = jsonb_set(data, '{is_read}', 'true') WHERE conversation_id = $1 AND sender_id <> $2 AND NOT is_read")
                    .bind(&conversation.id)
                    .bind(&user.id),
            )
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }
}

#[test]
fn pair_key_test() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    assert_eq!(pair_key(&a, &b), pair_key(&b, &a));
    assert_ne!(pair_key(&a, &b), pair_key(&a, &a));
}
