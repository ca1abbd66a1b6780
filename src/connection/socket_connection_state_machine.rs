use super::{ConnectionConfig, SocketTransport, WsSink, WsStream};
use crate::{
    error::Error,
    stomp::{Command, Frame},
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::{
    sync::{broadcast, mpsc, watch},
    time::timeout,
};
use tokio_tungstenite::tungstenite::{self, Message};

pub(super) struct Session {
    pub ws_tx: WsSink,
    pub ws_rx: WsStream,
}

///
/// Opens the socket and performs the CONNECT/CONNECTED exchange.
///
/// ### Errors
/// - [Error::HandshakeTimeout] when dialing or the handshake exceed the
///   idle window
/// - [Error::AuthRejected] when the server answers with an ERROR frame
/// - [Error::Transport] on socket-level failures
///
pub(super) async fn open_session(
    transport: &dyn SocketTransport,
    config: &ConnectionConfig,
    token: &str,
) -> Result<Session, Error> {
    let url = match config.token_in_query {
        true => format!("{}?token={}", config.url, token),
        false => config.url.clone(),
    };

    let (mut ws_tx, mut ws_rx) = match timeout(config.handshake_timeout, transport.dial(&url)).await
    {
        Ok(dialed) => dialed?,
        Err(_) => return Err(Error::HandshakeTimeout),
    };

    let connect_frame = Frame::new(Command::Connect)
        .header("accept-version", "1.2")
        .header("authorization", &format!("Bearer {token}"));
    ws_tx.send(Message::Text(connect_frame.encode())).await?;

    match timeout(config.handshake_timeout, await_connected(&mut ws_rx)).await {
        Ok(Ok(())) => Ok(Session { ws_tx, ws_rx }),
        Ok(Err(err)) => Err(err),
        Err(_) => Err(Error::HandshakeTimeout),
    }
}

async fn await_connected(ws_rx: &mut WsStream) -> Result<(), Error> {
    loop {
        match ws_rx.next().await {
            Some(Ok(Message::Text(text))) => {
                let frame = Frame::decode(&text)?;
                match frame.command {
                    Command::Connected => return Ok(()),
                    Command::Error => {
                        let reason = frame
                            .get_header("message")
                            .map(str::to_string)
                            .unwrap_or_else(|| frame.body.clone());
                        return Err(Error::AuthRejected(reason));
                    }
                    command => {
                        return Err(Error::Decode(format!(
                            "unexpected frame during handshake: {}",
                            command.as_ref()
                        )))
                    }
                }
            }
            // heartbeats before CONNECTED carry no information
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            Some(Ok(_)) => {
                return Err(Error::Decode(
                    "unexpected message type during handshake".to_string(),
                ))
            }
            Some(Err(err)) => return Err(Error::Transport(err)),
            None => return Err(Error::Transport(tungstenite::Error::ConnectionClosed)),
        }
    }
}

pub(super) struct SocketConnectionStateMachine {
    config: ConnectionConfig,
    token: String,
    transport: Arc<dyn SocketTransport>,

    session: Option<Session>,
    outbound_rx: mpsc::Receiver<Frame>,
    frames_tx: broadcast::Sender<Arc<Frame>>,
    connected_tx: watch::Sender<bool>,

    state: State,
}

enum State {
    Ok,
    Restoring,
    Stopped,
}

impl SocketConnectionStateMachine {
    pub fn new(
        config: ConnectionConfig,
        token: String,
        transport: Arc<dyn SocketTransport>,
        session: Session,
        outbound_rx: mpsc::Receiver<Frame>,
        frames_tx: broadcast::Sender<Arc<Frame>>,
        connected_tx: watch::Sender<bool>,
    ) -> Self {
        Self {
            config,
            token,
            transport,
            session: Some(session),
            outbound_rx,
            frames_tx,
            connected_tx,
            state: State::Ok,
        }
    }

    ///
    /// Infinite loop that keeps the connection alive.
    /// It's designed to work with external signal to stop it.
    /// ```ignore
    /// tokio::select! {
    ///     _ = notify.notified() => {}
    ///     _ = state_machine.run() => {}
    /// }
    /// ```
    ///
    pub async fn run(&mut self) {
        loop {
            match self.state {
                State::Ok => {
                    tracing::info!("connection state: Ok");
                    self.ok_state().await
                }
                State::Restoring => {
                    tracing::info!("connection state: Restoring");
                    self.restoring_state().await
                }
                State::Stopped => {
                    // the single retry failed, only a new session can reconnect.
                    // Stay alive so connected() receivers keep observing false
                    tracing::warn!("connection state: Stopped");
                    std::future::pending::<()>().await
                }
            }
        }
    }

    async fn ok_state(&mut self) {
        let Some(session) = self.session.as_mut() else {
            self.state = State::Restoring;
            return;
        };

        loop {
            tokio::select! {
                biased;

                message = session.ws_rx.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => match Frame::decode(&text) {
                            Ok(frame) if frame.command == Command::Message => {
                                // no subscription listening is not an error
                                let _ = self.frames_tx.send(Arc::new(frame));
                            }
                            Ok(frame) if frame.command == Command::Error => {
                                tracing::warn!(
                                    message = frame.get_header("message").unwrap_or_default(),
                                    "server closed the session with an error frame",
                                );
                                break;
                            }
                            Ok(frame) => {
                                tracing::trace!(command = frame.command.as_ref(), "ignoring frame");
                            }
                            // malformed frames never take the connection down
                            Err(err) => tracing::warn!(%err, "failed to decode frame"),
                        },
                        Some(Ok(Message::Ping(payload))) => {
                            if let Err(err) = session.ws_tx.send(Message::Pong(payload)).await {
                                tracing::warn!(%err, "failed to answer ping");
                                break;
                            }
                        }
                        Some(Ok(Message::Pong(_))) => tracing::trace!("processed pong message"),
                        Some(Ok(Message::Binary(_))) => {
                            tracing::warn!("unexpected binary message");
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("received close message");
                            break;
                        }
                        Some(Ok(_)) => (),
                        Some(Err(err)) => {
                            tracing::warn!(%err, "failed to read incoming message");
                            break;
                        }
                        None => {
                            tracing::info!("incoming messages stream closed");
                            break;
                        }
                    }
                }

                frame = self.outbound_rx.recv() => {
                    let Some(frame) = frame else {
                        // every sender dropped, connection handle is gone
                        self.state = State::Stopped;
                        return;
                    };

                    if let Err(err) = session.ws_tx.send(Message::Text(frame.encode())).await {
                        tracing::warn!(%err, "failed to send frame");
                        break;
                    }
                }
            }
        }

        tracing::warn!("connection broken");
        self.session = None;
        self.connected_tx.send_replace(false);
        self.state = State::Restoring;
    }

    async fn restoring_state(&mut self) {
        tokio::time::sleep(self.config.retry_backoff).await;

        tracing::info!("attempting to restore connection");
        match open_session(self.transport.as_ref(), &self.config, &self.token).await {
            Ok(session) => {
                self.session = Some(session);
                self.connected_tx.send_replace(true);
                tracing::info!("connection restored");
                self.state = State::Ok;
            }
            Err(err) => {
                tracing::warn!(%err, "failed to restore connection, giving up");
                self.state = State::Stopped;
            }
        }
    }
}
