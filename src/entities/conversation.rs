use chrono::{DateTime, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{invalid_input_error, unauthorized_error, Error};

pub const MAX_MESSAGE_LENGTH: usize = 5000;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub participant_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(initiator: Uuid, other: Uuid, now: DateTime<Utc>) -> Result<Self, Error> {
        if initiator == other {
            return Err(invalid_input_error()
                .with_field("user_id", "You cannot start a conversation with yourself"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            participant_ids: vec![initiator, other],
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_participant(&self, user_id: &Uuid) -> bool {
        self.participant_ids.contains(user_id)
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl PolarClass for Conversation {
    fn get_polar_class_builder() -> oso::ClassBuilder<Conversation> {
        oso::Class::builder()
            .name("Conversation")
            .add_attribute_getter("id", |recv: &Conversation| recv.id.to_string())
            .add_attribute_getter("participant_ids", |recv: &Conversation| {
                recv.participant_ids
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<String>>()
            })
    }

    fn get_polar_class() -> oso::Class {
        let builder = Conversation::get_polar_class_builder();
        builder.build()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        conversation: &Conversation,
        sender_id: Uuid,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, Error> {
        if !conversation.is_participant(&sender_id) {
            return Err(unauthorized_error()
                .with_message("Only participants can send messages in this conversation"));
        }

        let content = content.trim();

        if content.is_empty() {
            return Err(invalid_input_error().with_field("content", "Message cannot be empty"));
        }

        if content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(invalid_input_error().with_field(
                "content",
                format!("Message cannot exceed {} characters", MAX_MESSAGE_LENGTH),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            conversation_id: conversation.id,
            sender_id,
            content: content.into(),
            is_read: false,
            sent_at: now,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub last_message: Option<Message>,
    pub unread_count: i64,
}

#[test]
fn conversation_with_self_test() {
    let me = Uuid::new_v4();

    let err = Conversation::new(me, me, Utc::now()).unwrap_err();
    assert!(err.fields.contains_key("user_id"));

    let other = Uuid::new_v4();
    let conversation = Conversation::new(me, other, Utc::now()).unwrap();
    assert!(conversation.is_participant(&me));
    assert!(conversation.is_participant(&other));
    assert!(!conversation.is_participant(&Uuid::new_v4()));
}

#[test]
fn message_content_test() {
    let now = Utc::now();
    let conversation = Conversation::new(Uuid::new_v4(), Uuid::new_v4(), now).unwrap();
    let sender = conversation.participant_ids[0];

    assert!(Message::new(&conversation, sender, "   ", now).is_err());
    assert!(Message::new(&conversation, sender, &"x".repeat(MAX_MESSAGE_LENGTH + 1), now).is_err());

    let message = Message::new(&conversation, sender, "  Truck leaves at 6am ", now).unwrap();
    assert_eq!(message.content, "Truck leaves at 6am");
    assert!(!message.is_read);
}

#[test]
fn message_from_outsider_test() {
    let now = Utc::now();
    let conversation = Conversation::new(Uuid::new_v4(), Uuid::new_v4(), now).unwrap();

    let err = Message::new(&conversation, Uuid::new_v4(), "Hello", now).unwrap_err();
    assert_eq!(err.code, 102);

    let other = conversation.participant_ids[1];
    assert!(Message::new(&conversation, other, "Hello", now).is_ok());
}
