use super::Role;
use crate::dto::NotificationKind;

///
/// Tells whether an event of the given kind should be visible to the role.
///
/// Events are dropped at ingestion time, before they enter the store.
/// Kinds this layer does not recognize are visible to every role so an
/// unknown-but-relevant event is never silently hidden.
///
pub fn visible_to(role: Role, kind: &NotificationKind) -> bool {
    match kind {
        NotificationKind::OrderPlaced | NotificationKind::PaymentReceived => {
            matches!(role, Role::Seller | Role::Admin)
        }
        NotificationKind::OrderConfirmed
        | NotificationKind::OrderShipping
        | NotificationKind::OrderCompleted => matches!(role, Role::Buyer | Role::Admin),
        NotificationKind::OrderCancelled => true,
        NotificationKind::ShopApproved | NotificationKind::ShopRejected => {
            matches!(role, Role::Seller | Role::Admin)
        }
        NotificationKind::ChatMessage => true,
        NotificationKind::Other(_) => true,
    }
}
