use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::DynAPI;
use crate::auth::User;
use crate::entities::{Conversation, ConversationSummary, Message};
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct StartParams {
    user_id: Uuid,
}

#[derive(Serialize, Deserialize)]
pub struct SendParams {
    content: String,
}

#[derive(Serialize, Deserialize)]
pub struct ReadResult {
    updated: u64,
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<ConversationSummary>>, Error> {
    let conversations = api.list_conversations(user).await?;

    Ok(conversations.into())
}

pub async fn start(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Json(params): Json<StartParams>,
) -> Result<Json<Conversation>, Error> {
    let conversation = api.start_conversation(user, params.user_id).await?;

    Ok(conversation.into())
}

pub async fn messages(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, Error> {
    let messages = api.list_messages(user, id).await?;

    Ok(messages.into())
}

pub async fn send(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(params): Json<SendParams>,
) -> Result<Json<Message>, Error> {
    let message = api.send_message(user, id, params.content).await?;

    Ok(message.into())
}

pub async fn read(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReadResult>, Error> {
    let updated = api.mark_conversation_read(user, id).await?;

    Ok(ReadResult { updated }.into())
}
