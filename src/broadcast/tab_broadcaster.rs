use super::{
    dto::{TabBroadcasterConfig, TabEventKind, TabSignal},
    transport::{self, SignalPublisher, SignalReceiver},
};
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, Weak,
    },
};
use tokio::{sync::Notify, task::JoinHandle};
use uuid::Uuid;

type Callback = Arc<dyn Fn(Option<Value>) + Send + Sync>;
type ListenerMap = HashMap<TabEventKind, Vec<(u64, Callback)>>;

///
/// Synchronizes auth-identity facts between sibling tabs of the same
/// browser profile. Delivery is best-effort, at-least-once, within the
/// process only; a tab never hears its own broadcasts.
///
/// The broadcaster holds process-wide channel state, so its lifetime is
/// explicit: created by [TabBroadcaster::init], released by
/// [TabBroadcaster::destroy].
///
pub struct TabBroadcaster {
    origin: Uuid,
    publisher: Arc<dyn SignalPublisher>,
    listeners: Arc<Mutex<ListenerMap>>,
    next_listener_id: AtomicU64,
    dispatch_handle: JoinHandle<()>,
    close_notify: Arc<Notify>,
}

impl TabBroadcaster {
    ///
    /// Attaches to the named channel over the primary transport, falling
    /// back to the secondary transport when the primary is unavailable.
    /// Both behave identically from a subscriber's point of view.
    ///
    pub fn init(config: TabBroadcasterConfig) -> Self {
        match transport::attach_primary(&config.channel) {
            Ok((publisher, receiver)) => Self::with_transport(publisher, receiver),
            Err(err) => {
                tracing::warn!(%err, "primary tab channel unavailable, using fallback");
                let (publisher, receiver) = transport::attach_fallback(&config.channel);
                Self::with_transport(publisher, receiver)
            }
        }
    }

    pub fn with_transport(
        publisher: Arc<dyn SignalPublisher>,
        receiver: Box<dyn SignalReceiver>,
    ) -> Self {
        let origin = Uuid::new_v4();
        let listeners: Arc<Mutex<ListenerMap>> = Arc::new(Mutex::new(HashMap::new()));
        let close_notify = Arc::new(Notify::new());

        let dispatch_handle = tokio::spawn(dispatch(
            origin,
            receiver,
            Arc::clone(&listeners),
            Arc::clone(&close_notify),
        ));

        Self {
            origin,
            publisher,
            listeners,
            next_listener_id: AtomicU64::new(0),
            dispatch_handle,
            close_notify,
        }
    }

    pub fn broadcast(&self, kind: TabEventKind, data: Option<Value>) {
        let signal = TabSignal {
            origin: self.origin,
            kind,
            data,
        };
        self.publisher.publish(signal);
        tracing::debug!(kind = kind.as_ref(), "tab signal published");
    }

    ///
    /// Registers a callback for one event kind.
    ///
    /// ### Returns
    /// [Unsubscribe] handle. Consuming it fully removes the listener,
    /// repeated subscribe/unsubscribe cycles leave no listener behind.
    ///
    pub fn subscribe<F>(&self, kind: TabEventKind, callback: F) -> Unsubscribe
    where
        F: Fn(Option<Value>) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut listeners) = self.listeners.lock() {
            listeners
                .entry(kind)
                .or_default()
                .push((id, Arc::new(callback)));
        }

        Unsubscribe {
            listeners: Arc::downgrade(&self.listeners),
            kind,
            id,
        }
    }

    pub async fn destroy(self) {
        tracing::info!("destroying tab broadcaster");

        self.close_notify.notify_one();
        // task can't be aborted and will never panic
        self.dispatch_handle.await.unwrap();

        self.publisher.detach();

        tracing::info!("tab broadcaster destroyed");
    }
}

///
/// Capability to remove a listener registered with
/// [TabBroadcaster::subscribe].
///
pub struct Unsubscribe {
    listeners: Weak<Mutex<ListenerMap>>,
    kind: TabEventKind,
    id: u64,
}

impl Unsubscribe {
    pub fn unsubscribe(self) {
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };
        let Ok(mut listeners) = listeners.lock() else {
            return;
        };

        if let Some(callbacks) = listeners.get_mut(&self.kind) {
            callbacks.retain(|(id, _)| *id != self.id);
            if callbacks.is_empty() {
                listeners.remove(&self.kind);
            }
        }
    }
}

#[tracing::instrument(name = "Tab Broadcaster", skip_all, fields(origin = %origin))]
async fn dispatch(
    origin: Uuid,
    mut receiver: Box<dyn SignalReceiver>,
    listeners: Arc<Mutex<ListenerMap>>,
    close_notify: Arc<Notify>,
) {
    tracing::debug!("dispatch started");

    loop {
        tokio::select! {
            biased;

            _ = close_notify.notified() => break,

            signal = receiver.recv() => {
                let Some(signal) = signal else { break };
                if signal.origin == origin {
                    continue;
                }

                let callbacks = match listeners.lock() {
                    Ok(listeners) => listeners
                        .get(&signal.kind)
                        .map(|callbacks| callbacks.clone())
                        .unwrap_or_default(),
                    Err(_) => continue,
                };

                tracing::debug!(
                    kind = signal.kind.as_ref(),
                    count = callbacks.len(),
                    "dispatching tab signal",
                );
                for (_, callback) in callbacks {
                    callback(signal.data.clone());
                }
            }
        }
    }

    tracing::debug!("dispatch finished");
}
