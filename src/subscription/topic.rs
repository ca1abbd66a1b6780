use crate::{auth::Role, dto::StreamKind};

///
/// Fixed table mapping a stream and role to the topic the backend
/// publishes on. The chat stream uses one personal queue regardless of
/// role.
///
pub fn topic_for(stream: StreamKind, role: Role, user_id: &str) -> String {
    match (stream, role) {
        (StreamKind::Order, Role::Buyer) => format!("/topic/orders/{user_id}"),
        (StreamKind::Order, Role::Seller) => format!("/topic/seller-orders/{user_id}"),
        (StreamKind::Order, Role::Admin) => format!("/topic/admin/{user_id}"),
        (StreamKind::Chat, _) => format!("/queue/chat/{user_id}"),
    }
}
