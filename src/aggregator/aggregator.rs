use crate::{
    dto::{
        output::{AggregateView, NotificationEvent},
        NotificationKind,
    },
    store::StreamState,
};

///
/// Id of the synthesized chat entry when no chat message payload is
/// cached yet. Real chat-derived ids carry a `chat-` + message-id form,
/// order ids come from the server namespace, so this id can collide with
/// neither.
///
pub const CHAT_SUMMARY_FALLBACK_ID: &str = "chat-unread";

///
/// Merges both streams into the single view the UI reads.
///
/// Pure function, safe to call on every render. No ordering is assumed
/// between the two streams, so the merge is structural: when chat has
/// unread messages exactly one synthesized chat entry is pinned to the
/// front, order events follow in their stored order. Identical inputs
/// always produce an identical view.
///
pub fn compute_view(order: &StreamState, chat: &StreamState) -> AggregateView {
    let mut entries = Vec::with_capacity(order.events().len() + 1);

    if chat.unread_count() > 0 {
        entries.push(chat_summary(chat));
    }
    entries.extend(order.events().iter().cloned());

    AggregateView {
        entries,
        unread_count: order.unread_count() + chat.unread_count(),
    }
}

fn chat_summary(chat: &StreamState) -> NotificationEvent {
    match chat.events().iter().find(|event| !event.read) {
        Some(latest) => latest.clone(),
        // unread counter was seeded from REST before any payload arrived
        None => NotificationEvent {
            id: CHAT_SUMMARY_FALLBACK_ID.to_string(),
            kind: NotificationKind::ChatMessage,
            message: format!("{} unread messages", chat.unread_count()),
            related_order_id: None,
            related_conversation_id: None,
            timestamp_ms: 0,
            read: false,
        },
    }
}
