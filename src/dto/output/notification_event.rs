use crate::dto::NotificationKind;

///
/// A single server-pushed fact, normalized for the store and the UI.
///
/// Created when the transport decodes an inbound frame or when the REST
/// hydrate call replays history. The `read` flag is the only field mutated
/// after creation, and only by explicit user action.
///
#[derive(Clone, Debug, PartialEq)]
pub struct NotificationEvent {
    pub id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub related_order_id: Option<String>,
    pub related_conversation_id: Option<String>,
    pub timestamp_ms: i64,
    pub read: bool,
}
