use super::NotificationEvent;

///
/// Merged, read-only view over both streams. Derived on every store
/// change, never stored.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AggregateView {
    pub entries: Vec<NotificationEvent>,
    pub unread_count: usize,
}
