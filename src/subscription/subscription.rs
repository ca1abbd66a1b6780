use super::{topic_for, EventHandler};
use crate::{
    auth::Role,
    connection::StreamLink,
    dto::{
        input::{ChatMessageFrame, OrderNotificationFrame},
        output::NotificationEvent,
        StreamKind,
    },
    error::Error,
    stomp::{Command, Frame},
};
use std::sync::Arc;
use tokio::{
    sync::{broadcast, mpsc, watch, Notify},
    task::JoinHandle,
};
use uuid::Uuid;

///
/// Live subscription of one (stream, role, user) triple. It subscribes
/// on open, resubscribes whenever the connection is restored and stops
/// delivering the moment [Self::close] is called.
///
/// Exactly one subscription per (stream, user) is expected to be live,
/// [super::SubscriptionRouter] enforces the swap.
///
pub struct Subscription {
    id: String,
    topic: String,
    outbound: mpsc::Sender<Frame>,

    task_handle: JoinHandle<()>,
    close_notify: Arc<Notify>,
}

impl Subscription {
    pub async fn open(
        link: &StreamLink,
        stream: StreamKind,
        role: Role,
        user_id: &str,
        handler: Arc<dyn EventHandler>,
    ) -> Self {
        let id = format!("sub-{}", Uuid::new_v4());
        let topic = topic_for(stream, role, user_id);

        let outbound = link.sender();
        if outbound.send(subscribe_frame(&id, &topic)).await.is_err() {
            // connection already gone, the resubscribe path takes over
            // if it ever comes back
            tracing::warn!(topic, "failed to send initial subscribe frame");
        }
        tracing::info!(stream = stream.as_ref(), topic, "subscription opened");

        let worker = SubscriptionWorker {
            stream,
            id: id.clone(),
            topic: topic.clone(),
            outbound: outbound.clone(),
            frames_rx: link.frames(),
            connected_rx: link.connected(),
            handler,
        };

        let close_notify = Arc::new(Notify::new());
        let close_notify_clone = Arc::clone(&close_notify);
        let task_handle = tokio::spawn(async move {
            tokio::select! {
                biased;

                _ = close_notify_clone.notified() => {}
                _ = worker.run() => {}
            }
        });

        Self {
            id,
            topic,
            outbound,
            task_handle,
            close_notify,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    ///
    /// Stops delivery and tells the server to drop the subscription.
    /// Closing a subscription whose connection is already gone is not an
    /// error.
    ///
    pub async fn close(self) {
        tracing::info!(topic = self.topic, "closing subscription");

        self.close_notify.notify_one();
        // task can't be aborted and will never panic
        self.task_handle.await.unwrap();

        // best effort, the connection may already be down
        let unsubscribe = Frame::new(Command::Unsubscribe).header("id", &self.id);
        let _ = self.outbound.try_send(unsubscribe);

        tracing::info!(topic = self.topic, "subscription closed");
    }
}

struct SubscriptionWorker {
    stream: StreamKind,
    id: String,
    topic: String,
    outbound: mpsc::Sender<Frame>,
    frames_rx: broadcast::Receiver<Arc<Frame>>,
    connected_rx: watch::Receiver<bool>,
    handler: Arc<dyn EventHandler>,
}

impl SubscriptionWorker {
    #[tracing::instrument(
        name = "Subscription",
        skip_all,
        fields(stream = self.stream.as_ref(), topic = self.topic),
    )]
    async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                frame = self.frames_rx.recv() => match frame {
                    Ok(frame) => self.process_frame(frame).await,
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        // events are idempotent by id, hydrate repairs gaps
                        tracing::warn!(count, "subscription lagged, frames skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },

                changed = self.connected_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if *self.connected_rx.borrow_and_update() {
                        tracing::info!("connection restored, resubscribing");
                        let frame = subscribe_frame(&self.id, &self.topic);
                        if self.outbound.send(frame).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }

        tracing::info!("subscription worker finished");
    }

    async fn process_frame(&self, frame: Arc<Frame>) {
        // frames of sibling subscriptions on the same socket are not ours
        if frame.get_header("subscription") != Some(self.id.as_str()) {
            return;
        }

        match decode_event(self.stream, &frame.body) {
            Ok(event) => {
                tracing::debug!(id = event.id, "event received");
                self.handler.handle(event).await;
            }
            // malformed frame must not crash the subscription
            // or drop subsequent frames
            Err(err) => tracing::warn!(%err, "failed to decode event"),
        }
    }
}

fn subscribe_frame(id: &str, topic: &str) -> Frame {
    Frame::new(Command::Subscribe)
        .header("id", id)
        .header("destination", topic)
}

fn decode_event(stream: StreamKind, body: &str) -> Result<NotificationEvent, Error> {
    let event = match stream {
        StreamKind::Order => serde_json::from_str::<OrderNotificationFrame>(body)
            .map_err(|err| Error::Decode(err.to_string()))?
            .into(),
        StreamKind::Chat => serde_json::from_str::<ChatMessageFrame>(body)
            .map_err(|err| Error::Decode(err.to_string()))?
            .into(),
    };

    Ok(event)
}
