use crate::dto::output::NotificationEvent;
use async_trait::async_trait;

///
/// Sink for events decoded by a subscription. Implemented by the engine's
/// ingestion path, mocked in tests.
///
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: NotificationEvent);
}
