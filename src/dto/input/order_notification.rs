use super::timestamp_millis;
use crate::dto::{output::NotificationEvent, NotificationKind};
use serde::Deserialize;
use std::str::FromStr;

///
/// Frame pushed on the order-notification topic, also the shape returned
/// by the `GET /notifications` hydrate call.
///
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotificationFrame {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(with = "timestamp_millis")]
    pub timestamp: i64,
    #[serde(default)]
    pub read: bool,
}

impl From<OrderNotificationFrame> for NotificationEvent {
    fn from(frame: OrderNotificationFrame) -> Self {
        // from_str is infallible, unmatched kinds fall into Other
        let kind = NotificationKind::from_str(&frame.kind)
            .unwrap_or_else(|_| NotificationKind::Other(frame.kind.clone()));

        Self {
            id: frame.id,
            kind,
            message: frame.message,
            related_order_id: frame.order_id,
            related_conversation_id: None,
            timestamp_ms: frame.timestamp,
            read: frame.read,
        }
    }
}
