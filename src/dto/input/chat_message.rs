use super::timestamp_millis;
use crate::dto::{output::NotificationEvent, NotificationKind};
use serde::Deserialize;

///
/// Frame pushed on the per-user chat queue whenever a new chat message
/// arrives. The client derives a notification event from it, the message
/// body itself stays opaque to this layer.
///
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageFrame {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub content: String,
    #[serde(with = "timestamp_millis")]
    pub created_at: i64,
}

impl From<ChatMessageFrame> for NotificationEvent {
    fn from(frame: ChatMessageFrame) -> Self {
        Self {
            // "chat-" prefix keeps the derived id out of the order-stream
            // id namespace
            id: format!("chat-{}", frame.id),
            kind: NotificationKind::ChatMessage,
            message: format!("{}: {}", frame.sender_name, frame.content),
            related_order_id: None,
            related_conversation_id: Some(frame.conversation_id),
            timestamp_ms: frame.created_at,
            read: false,
        }
    }
}
