use std::fmt::{self, Display};
use strum::EnumString;

///
/// Tagged kind of a server-pushed notification.
///
/// The set of kinds the backend emits grows over time. Kinds this build
/// does not know yet are preserved as [NotificationKind::Other] instead of
/// failing to decode, so parsing the wire `type` field never errors.
///
#[derive(Clone, Debug, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    OrderPlaced,
    OrderConfirmed,
    OrderShipping,
    OrderCompleted,
    OrderCancelled,
    PaymentReceived,
    ChatMessage,
    ShopApproved,
    ShopRejected,
    #[strum(default)]
    Other(String),
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotificationKind::OrderPlaced => "ORDER_PLACED",
            NotificationKind::OrderConfirmed => "ORDER_CONFIRMED",
            NotificationKind::OrderShipping => "ORDER_SHIPPING",
            NotificationKind::OrderCompleted => "ORDER_COMPLETED",
            NotificationKind::OrderCancelled => "ORDER_CANCELLED",
            NotificationKind::PaymentReceived => "PAYMENT_RECEIVED",
            NotificationKind::ChatMessage => "CHAT_MESSAGE",
            NotificationKind::ShopApproved => "SHOP_APPROVED",
            NotificationKind::ShopRejected => "SHOP_REJECTED",
            NotificationKind::Other(name) => name,
        };

        f.write_str(name)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn known_kind_parsed() {
        let kind = NotificationKind::from_str("ORDER_CONFIRMED").unwrap();
        assert_eq!(kind, NotificationKind::OrderConfirmed);
    }

    #[test]
    fn unknown_kind_preserved() {
        let kind = NotificationKind::from_str("FLASH_SALE").unwrap();
        assert_eq!(kind, NotificationKind::Other("FLASH_SALE".to_string()));
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(NotificationKind::OrderPlaced.to_string(), "ORDER_PLACED");
        assert_eq!(
            NotificationKind::Other("FLASH_SALE".to_string()).to_string(),
            "FLASH_SALE"
        );
    }
}
