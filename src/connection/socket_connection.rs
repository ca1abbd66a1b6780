use super::{
    socket_connection_state_machine::{open_session, SocketConnectionStateMachine},
    ConnectionConfig, SocketTransport,
};
use crate::{dto::StreamKind, error::Error, stomp::Frame};
use std::sync::Arc;
use tokio::{
    sync::{broadcast, mpsc, watch, Notify},
    task::JoinHandle,
};

///
/// Socket connection of one logical stream.
/// It runs background task that restores the session after an IO failure:
/// one attempt after a fixed backoff, then it gives up until a new
/// session is started.
///
/// Liveness can be observed through [Self::connected], inbound MESSAGE
/// frames through [Self::frames].
///
pub struct SocketConnection {
    connected_rx: watch::Receiver<bool>,
    frames_tx: broadcast::Sender<Arc<Frame>>,
    outbound_tx: mpsc::Sender<Frame>,

    keep_alive_handle: JoinHandle<()>,
    close_notify: Arc<Notify>,
}

impl SocketConnection {
    ///
    /// Opens the connection and performs the handshake.
    ///
    /// ### Errors
    /// - [Error::MissingToken] when the token is empty. No socket is
    ///   opened and no retry is scheduled
    /// - [Error::AuthRejected] when the server refuses the token
    /// - [Error::HandshakeTimeout] / [Error::Transport] on socket failures
    ///
    #[tracing::instrument(
        name = "Socket Connection",
        skip_all,
        fields(stream = stream.as_ref()),
    )]
    pub async fn connect(
        config: ConnectionConfig,
        stream: StreamKind,
        token: &str,
        transport: Arc<dyn SocketTransport>,
    ) -> Result<Self, Error> {
        if token.is_empty() {
            tracing::warn!("refusing to connect without a token");
            return Err(Error::MissingToken);
        }

        tracing::info!("opening connection");
        let session = open_session(transport.as_ref(), &config, token).await?;

        let (connected_tx, connected_rx) = watch::channel(true);
        let (frames_tx, _) = broadcast::channel(config.buffer_size);
        let (outbound_tx, outbound_rx) = mpsc::channel(config.buffer_size);

        tracing::info!("starting keep alive task");
        let close_notify = Arc::new(Notify::new());
        let state_machine = SocketConnectionStateMachine::new(
            config,
            token.to_string(),
            transport,
            session,
            outbound_rx,
            frames_tx.clone(),
            connected_tx,
        );
        let keep_alive_handle =
            tokio::spawn(keep_alive(Arc::clone(&close_notify), state_machine, stream));

        tracing::info!("connection opened");

        Ok(Self {
            connected_rx,
            frames_tx,
            outbound_tx,
            keep_alive_handle,
            close_notify,
        })
    }

    pub fn connected(&self) -> watch::Receiver<bool> {
        self.connected_rx.clone()
    }

    pub fn link(&self) -> super::StreamLink {
        super::StreamLink::new(
            self.outbound_tx.clone(),
            self.frames_tx.clone(),
            self.connected_rx.clone(),
        )
    }

    pub fn frames(&self) -> broadcast::Receiver<Arc<Frame>> {
        self.frames_tx.subscribe()
    }

    pub fn sender(&self) -> mpsc::Sender<Frame> {
        self.outbound_tx.clone()
    }

    ///
    /// Close underlying socket and the task that restores it.
    /// Closing an already-broken connection is not an error.
    ///
    pub async fn close(self) {
        tracing::info!("closing connection");

        self.close_notify.notify_one();
        // task can't be aborted and will never panic
        self.keep_alive_handle.await.unwrap();

        tracing::info!("connection closed");
    }
}

#[tracing::instrument(name = "Socket Connection", skip_all, fields(stream = stream.as_ref()))]
async fn keep_alive(
    close_notify: Arc<Notify>,
    mut state_machine: SocketConnectionStateMachine,
    stream: StreamKind,
) {
    tracing::info!("keep alive started");

    tokio::select! {
        biased;

        _ = close_notify.notified() => {}
        _ = state_machine.run() => {}
    }

    tracing::info!("keep alive finished");
}
