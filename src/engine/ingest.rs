use crate::{
    aggregator::compute_view,
    auth::{visible_to, Role},
    dto::output::{AggregateView, NotificationEvent},
    store::StreamState,
    subscription::EventHandler,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

///
/// Recomputes the merged view after a store change.
/// Lock order is order stream before chat stream, everywhere.
///
#[derive(Clone)]
pub(super) struct ViewPublisher {
    order_state: Arc<Mutex<StreamState>>,
    chat_state: Arc<Mutex<StreamState>>,
    view_tx: Arc<watch::Sender<AggregateView>>,
}

impl ViewPublisher {
    pub fn new(
        order_state: Arc<Mutex<StreamState>>,
        chat_state: Arc<Mutex<StreamState>>,
        view_tx: Arc<watch::Sender<AggregateView>>,
    ) -> Self {
        Self {
            order_state,
            chat_state,
            view_tx,
        }
    }

    pub async fn refresh(&self) {
        let order = self.order_state.lock().await;
        let chat = self.chat_state.lock().await;
        let view = compute_view(&order, &chat);
        drop(chat);
        drop(order);

        self.view_tx.send_replace(view);
    }
}

///
/// Ingestion path of one stream: role filter, idempotent store insert,
/// view refresh. Events whose kind the role must not see are dropped
/// before they enter the store.
///
pub(super) struct IngestHandler {
    role: Role,
    state: Arc<Mutex<StreamState>>,
    publisher: ViewPublisher,
}

impl IngestHandler {
    pub fn new(role: Role, state: Arc<Mutex<StreamState>>, publisher: ViewPublisher) -> Self {
        Self {
            role,
            state,
            publisher,
        }
    }
}

#[async_trait]
impl EventHandler for IngestHandler {
    #[tracing::instrument(name = "Ingest", skip_all, fields(id = %event.id, kind = %event.kind))]
    async fn handle(&self, event: NotificationEvent) {
        if !visible_to(self.role, &event.kind) {
            tracing::debug!(role = self.role.as_ref(), "event not visible to role, dropped");
            return;
        }

        let inserted = { self.state.lock().await.apply_inbound(event) };
        if inserted {
            self.publisher.refresh().await;
        }
    }
}
