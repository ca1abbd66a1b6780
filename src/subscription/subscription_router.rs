use super::{EventHandler, Subscription};
use crate::{auth::Role, connection::StreamLink, dto::StreamKind};
use std::sync::Arc;

///
/// Owns the single live subscription of one stream and swaps it when the
/// role or user changes. The previous subscription is fully closed before
/// the new one is opened, so a swap never leaves a double-delivery window
/// behind.
///
pub struct SubscriptionRouter {
    stream: StreamKind,
    active: Option<Subscription>,
}

impl SubscriptionRouter {
    pub fn new(stream: StreamKind) -> Self {
        Self {
            stream,
            active: None,
        }
    }

    #[tracing::instrument(
        name = "Subscription Router",
        skip_all,
        fields(stream = self.stream.as_ref(), role = role.as_ref(), user_id),
    )]
    pub async fn subscribe(
        &mut self,
        link: &StreamLink,
        role: Role,
        user_id: &str,
        handler: Arc<dyn EventHandler>,
    ) {
        if let Some(previous) = self.active.take() {
            tracing::info!(topic = previous.topic(), "closing previous subscription");
            previous.close().await;
        }

        let subscription = Subscription::open(link, self.stream, role, user_id, handler).await;
        self.active = Some(subscription);
    }

    pub async fn close(&mut self) {
        if let Some(subscription) = self.active.take() {
            subscription.close().await;
        }
    }

    pub fn topic(&self) -> Option<&str> {
        self.active.as_ref().map(Subscription::topic)
    }
}
