use super::{
    ingest::{IngestHandler, ViewPublisher},
    EngineConfig,
};
use crate::{
    api::NotificationsApi,
    auth::{visible_to, Role},
    connection::{ConnectionConfig, SocketConnection, SocketTransport, TungsteniteTransport},
    dto::{output::AggregateView, StreamKind, UserIdentity},
    error::Error,
    store::StreamState,
    subscription::SubscriptionRouter,
};
use std::sync::Arc;
use tokio::{
    sync::{watch, Mutex, Notify},
    task::JoinHandle,
};

///
/// Composition root of the realtime layer: owns both stream connections,
/// the per-stream stores and the merged view. One instance per logical
/// user session; notification state is never shared across tabs, only
/// auth facts travel through [crate::broadcast::TabBroadcaster].
///
pub struct SyncEngine {
    config: EngineConfig,
    api: Arc<dyn NotificationsApi>,
    transport: Arc<dyn SocketTransport>,

    order_state: Arc<Mutex<StreamState>>,
    chat_state: Arc<Mutex<StreamState>>,
    view_tx: Arc<watch::Sender<AggregateView>>,
    view_rx: watch::Receiver<AggregateView>,

    session: Option<EngineSession>,
}

struct EngineSession {
    identity: UserIdentity,

    order_connection: SocketConnection,
    chat_connection: SocketConnection,
    order_router: SubscriptionRouter,
    chat_router: SubscriptionRouter,

    connected_tasks: Vec<JoinHandle<()>>,
    rehydrate: Option<RehydrateTask>,
}

struct RehydrateTask {
    handle: JoinHandle<()>,
    close_notify: Arc<Notify>,
}

impl SyncEngine {
    pub fn new(config: EngineConfig, api: Arc<dyn NotificationsApi>) -> Self {
        Self::with_transport(config, api, Arc::new(TungsteniteTransport))
    }

    pub fn with_transport(
        config: EngineConfig,
        api: Arc<dyn NotificationsApi>,
        transport: Arc<dyn SocketTransport>,
    ) -> Self {
        let order_state = Arc::new(Mutex::new(StreamState::new()));
        let chat_state = Arc::new(Mutex::new(StreamState::new()));
        let (view_tx, view_rx) = watch::channel(AggregateView::default());

        Self {
            config,
            api,
            transport,
            order_state,
            chat_state,
            view_tx: Arc::new(view_tx),
            view_rx,
            session: None,
        }
    }

    ///
    /// Single read interface of the merged feed. The receiver observes a
    /// fresh [AggregateView] after every store change.
    ///
    pub fn view(&self) -> watch::Receiver<AggregateView> {
        self.view_rx.clone()
    }

    pub fn identity(&self) -> Option<&UserIdentity> {
        self.session.as_ref().map(|session| &session.identity)
    }

    pub async fn stream_connected(&self, stream: StreamKind) -> bool {
        let state = match stream {
            StreamKind::Order => &self.order_state,
            StreamKind::Chat => &self.chat_state,
        };

        state.lock().await.connected()
    }

    ///
    /// Starts the session for a known identity: hydrates history over
    /// REST, opens both stream connections and attaches the role-derived
    /// subscriptions. A session that is already running is torn down
    /// first.
    ///
    /// ### Errors
    /// - [Error::MissingToken] when the identity carries no token
    /// - [Error::AuthRejected] when a handshake is refused
    /// - [Error::Api] / [Error::Transport] / [Error::HandshakeTimeout]
    ///   on collaborator failures
    ///
    #[tracing::instrument(
        name = "Sync Engine",
        skip_all,
        fields(user_id = %identity.user_id, role = identity.role.as_ref()),
    )]
    pub async fn start(&mut self, identity: UserIdentity) -> Result<(), Error> {
        if self.session.is_some() {
            self.shutdown().await;
        }

        tracing::info!("starting session");

        // REST ground truth first, socket increments build on top of it
        self.hydrate(identity.role).await?;
        let chat_unread = self.api.unread_chat_count(&identity.user_id).await?;
        self.chat_state.lock().await.seed_unread(chat_unread);
        // history is worth showing even if the sockets fail below
        self.publisher().refresh().await;

        let order_connection = SocketConnection::connect(
            self.connection_config(&self.config.order_stream_url),
            StreamKind::Order,
            &identity.token,
            Arc::clone(&self.transport),
        )
        .await?;
        let chat_connection = match SocketConnection::connect(
            self.connection_config(&self.config.chat_stream_url),
            StreamKind::Chat,
            &identity.token,
            Arc::clone(&self.transport),
        )
        .await
        {
            Ok(connection) => connection,
            Err(err) => {
                order_connection.close().await;
                return Err(err);
            }
        };

        {
            self.order_state.lock().await.set_connected(true);
            self.chat_state.lock().await.set_connected(true);
        }

        let publisher = self.publisher();

        let mut order_router = SubscriptionRouter::new(StreamKind::Order);
        order_router
            .subscribe(
                &order_connection.link(),
                identity.role,
                &identity.user_id,
                Arc::new(IngestHandler::new(
                    identity.role,
                    Arc::clone(&self.order_state),
                    publisher.clone(),
                )),
            )
            .await;

        let mut chat_router = SubscriptionRouter::new(StreamKind::Chat);
        chat_router
            .subscribe(
                &chat_connection.link(),
                identity.role,
                &identity.user_id,
                Arc::new(IngestHandler::new(
                    identity.role,
                    Arc::clone(&self.chat_state),
                    publisher.clone(),
                )),
            )
            .await;

        let connected_tasks = vec![
            tokio::spawn(watch_connected(
                StreamKind::Order,
                order_connection.connected(),
                Arc::clone(&self.order_state),
            )),
            tokio::spawn(watch_connected(
                StreamKind::Chat,
                chat_connection.connected(),
                Arc::clone(&self.chat_state),
            )),
        ];

        let rehydrate = self.config.rehydrate_interval.map(|interval| {
            let close_notify = Arc::new(Notify::new());
            let handle = tokio::spawn(rehydrate_loop(
                interval,
                Arc::clone(&self.api),
                identity.role,
                Arc::clone(&self.order_state),
                publisher.clone(),
                Arc::clone(&close_notify),
            ));

            RehydrateTask {
                handle,
                close_notify,
            }
        });

        publisher.refresh().await;

        self.session = Some(EngineSession {
            identity,
            order_connection,
            chat_connection,
            order_router,
            chat_router,
            connected_tasks,
            rehydrate,
        });

        tracing::info!("session started");

        Ok(())
    }

    ///
    /// Re-points every subscription at the new identity. The old
    /// session's subscriptions and sockets are fully torn down before
    /// the new ones exist.
    ///
    pub async fn change_identity(&mut self, identity: UserIdentity) -> Result<(), Error> {
        tracing::info!("identity changed, restarting session");

        self.start(identity).await
    }

    ///
    /// Tears down subscriptions and connections and resets notification
    /// state. Calling it without a running session is a no-op.
    ///
    #[tracing::instrument(name = "Sync Engine", skip_all)]
    pub async fn shutdown(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        tracing::info!("shutting down session");

        session.order_router.close().await;
        session.chat_router.close().await;
        session.order_connection.close().await;
        session.chat_connection.close().await;

        // watcher tasks end once the connections' watch channels are gone
        for task in session.connected_tasks {
            // task can't be aborted and will never panic
            task.await.unwrap();
        }

        if let Some(rehydrate) = session.rehydrate {
            rehydrate.close_notify.notify_one();
            // task can't be aborted and will never panic
            rehydrate.handle.await.unwrap();
        }

        // notification state is per-session
        *self.order_state.lock().await = StreamState::new();
        *self.chat_state.lock().await = StreamState::new();
        self.view_tx.send_replace(AggregateView::default());

        tracing::info!("session shut down");
    }

    pub async fn mark_read(&self, id: &str) -> Result<(), Error> {
        self.api.mark_read(id).await?;

        let marked = { self.order_state.lock().await.mark_read(id) };
        if !marked {
            self.chat_state.lock().await.mark_read(id);
        }
        self.publisher().refresh().await;

        Ok(())
    }

    pub async fn mark_all_read(&self) -> Result<(), Error> {
        self.api.mark_all_read().await?;

        self.order_state.lock().await.mark_all_read();
        self.publisher().refresh().await;

        Ok(())
    }

    ///
    /// Clears the chat unread badge locally, e.g. when the chat widget
    /// is opened. Chat read-state lives with the conversations, there is
    /// no notification endpoint to call.
    ///
    pub async fn mark_chat_read(&self) {
        self.chat_state.lock().await.mark_all_read();
        self.publisher().refresh().await;
    }

    pub async fn remove(&self, id: &str) -> Result<(), Error> {
        self.api.delete(id).await?;

        self.order_state.lock().await.remove(id);
        self.publisher().refresh().await;

        Ok(())
    }

    pub async fn clear_all(&self) -> Result<(), Error> {
        self.api.clear_all().await?;

        self.order_state.lock().await.clear_all();
        self.publisher().refresh().await;

        Ok(())
    }

    async fn hydrate(&self, role: Role) -> Result<(), Error> {
        let events = self.api.fetch_notifications().await?;
        let visible = events
            .into_iter()
            .filter(|event| visible_to(role, &event.kind))
            .collect();

        self.order_state.lock().await.hydrate(visible);

        Ok(())
    }

    fn publisher(&self) -> ViewPublisher {
        ViewPublisher::new(
            Arc::clone(&self.order_state),
            Arc::clone(&self.chat_state),
            Arc::clone(&self.view_tx),
        )
    }

    fn connection_config(&self, url: &str) -> ConnectionConfig {
        ConnectionConfig {
            url: url.to_string(),
            handshake_timeout: self.config.handshake_timeout,
            retry_backoff: self.config.retry_backoff,
            token_in_query: self.config.token_in_query,
            buffer_size: self.config.buffer_size,
        }
    }
}

///
/// Mirrors transport liveness into the stream's store. A disconnected
/// stream keeps its last known list, the flag is all the UI sees.
///
#[tracing::instrument(name = "Connected Watcher", skip_all, fields(stream = stream.as_ref()))]
async fn watch_connected(
    stream: StreamKind,
    mut connected_rx: watch::Receiver<bool>,
    state: Arc<Mutex<StreamState>>,
) {
    loop {
        let connected = *connected_rx.borrow_and_update();
        state.lock().await.set_connected(connected);

        if connected_rx.changed().await.is_err() {
            state.lock().await.set_connected(false);
            break;
        }
    }
}

#[tracing::instrument(name = "Rehydrate", skip_all, fields(role = role.as_ref()))]
async fn rehydrate_loop(
    interval: std::time::Duration,
    api: Arc<dyn NotificationsApi>,
    role: Role,
    order_state: Arc<Mutex<StreamState>>,
    publisher: ViewPublisher,
    close_notify: Arc<Notify>,
) {
    loop {
        tokio::select! {
            biased;

            _ = close_notify.notified() => break,

            _ = tokio::time::sleep(interval) => {
                tracing::debug!("reconciling notification state");
                match api.fetch_notifications().await {
                    Ok(events) => {
                        let visible = events
                            .into_iter()
                            .filter(|event| visible_to(role, &event.kind))
                            .collect();
                        order_state.lock().await.hydrate(visible);
                        publisher.refresh().await;
                        tracing::debug!("notification state reconciled");
                    }
                    // local state stays authoritative until the next pass
                    Err(err) => tracing::warn!(%err, "failed to reconcile notification state"),
                }
            }
        }
    }
}
