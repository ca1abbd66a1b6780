use async_trait::async_trait;
use futures::{channel::mpsc as futures_mpsc, SinkExt, StreamExt};
use std::{
    sync::{Arc, Mutex, Once},
    time::Duration,
};
use storefront_realtime::{
    AggregateView, Command, EngineConfig, Error, Frame, NotificationEvent, NotificationKind,
    NotificationsApi, Role, SocketTransport, UserIdentity, WsSink, WsStream,
};
use tokio::{
    sync::{mpsc, watch},
    time::timeout,
};
use tokio_tungstenite::tungstenite::{self, Message};

///
/// Transport standing in for the backend: every dial yields a fresh
/// channel-backed session that has already answered CONNECTED, and the
/// matching [ServerEnd] pops out of the receiver returned by
/// [fake_backend].
///
pub struct FakeBackend {
    sessions_tx: mpsc::UnboundedSender<ServerEnd>,
}

static INIT_TRACING_ONCE: Once = Once::new();

pub fn fake_backend() -> (Arc<FakeBackend>, mpsc::UnboundedReceiver<ServerEnd>) {
    INIT_TRACING_ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });

    let (sessions_tx, sessions_rx) = mpsc::unbounded_channel();

    (Arc::new(FakeBackend { sessions_tx }), sessions_rx)
}

#[async_trait]
impl SocketTransport for FakeBackend {
    async fn dial(&self, url: &str) -> Result<(WsSink, WsStream), Error> {
        let (client_tx, from_client) = futures_mpsc::unbounded::<Message>();
        let (to_client, client_rx) =
            futures_mpsc::unbounded::<Result<Message, tungstenite::Error>>();

        let server = ServerEnd {
            url: url.to_string(),
            to_client,
            from_client,
        };
        server.push_frame(Frame::new(Command::Connected).header("version", "1.2"));

        self.sessions_tx
            .send(server)
            .map_err(|_| Error::Transport(tungstenite::Error::ConnectionClosed))?;

        let sink: WsSink =
            Box::pin(client_tx.sink_map_err(|_| tungstenite::Error::ConnectionClosed));
        let stream: WsStream = Box::pin(client_rx);

        Ok((sink, stream))
    }
}

pub struct ServerEnd {
    pub url: String,
    to_client: futures_mpsc::UnboundedSender<Result<Message, tungstenite::Error>>,
    from_client: futures_mpsc::UnboundedReceiver<Message>,
}

impl ServerEnd {
    pub fn push_frame(&self, frame: Frame) {
        let _ = self
            .to_client
            .unbounded_send(Ok(Message::Text(frame.encode())));
    }

    pub fn push_order_notification(&self, subscription_id: &str, id: &str, kind: &str) {
        let body = format!(
            r#"{{"id":"{id}","type":"{kind}","message":"notification","timestamp":1,"read":false}}"#
        );
        self.push_frame(
            Frame::new(Command::Message)
                .header("subscription", subscription_id)
                .body(&body),
        );
    }

    pub fn push_chat_message(&self, subscription_id: &str, id: &str, content: &str) {
        let body = format!(
            r#"{{"id":"{id}","conversationId":"c1","senderId":"u2","senderName":"Mai","content":"{content}","createdAt":2}}"#
        );
        self.push_frame(
            Frame::new(Command::Message)
                .header("subscription", subscription_id)
                .body(&body),
        );
    }

    pub async fn next_frame(&mut self) -> Frame {
        let message = timeout(Duration::from_secs(2), self.from_client.next())
            .await
            .unwrap() // timeout
            .unwrap(); // stream open
        let Message::Text(text) = message else {
            panic!("invalid message type");
        };

        Frame::decode(&text).unwrap()
    }

    ///
    /// Resolves once the client side of the socket is gone.
    ///
    pub async fn await_closed(&mut self) {
        while self.from_client.next().await.is_some() {}
    }

    ///
    /// Skips handshake frames and returns the next SUBSCRIBE.
    ///
    pub async fn await_subscribe(&mut self) -> Frame {
        loop {
            let frame = self.next_frame().await;
            if frame.command == Command::Subscribe {
                return frame;
            }
        }
    }
}

///
/// REST collaborator stub: serves a configurable snapshot and records
/// every mutating call.
///
#[derive(Default)]
pub struct StubApi {
    pub notifications: Mutex<Vec<NotificationEvent>>,
    pub chat_unread: Mutex<usize>,
    pub calls: Mutex<Vec<String>>,
}

impl StubApi {
    pub fn with_notifications(notifications: Vec<NotificationEvent>) -> Arc<Self> {
        let api = Self::default();
        *api.notifications.lock().unwrap() = notifications;

        Arc::new(api)
    }
}

#[async_trait]
impl NotificationsApi for StubApi {
    async fn fetch_notifications(&self) -> Result<Vec<NotificationEvent>, Error> {
        Ok(self.notifications.lock().unwrap().clone())
    }

    async fn mark_read(&self, id: &str) -> Result<(), Error> {
        self.calls.lock().unwrap().push(format!("mark_read:{id}"));
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<(), Error> {
        self.calls.lock().unwrap().push("mark_all_read".to_string());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), Error> {
        self.calls.lock().unwrap().push(format!("delete:{id}"));
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), Error> {
        self.calls.lock().unwrap().push("clear_all".to_string());
        Ok(())
    }

    async fn unread_chat_count(&self, _user_id: &str) -> Result<usize, Error> {
        Ok(*self.chat_unread.lock().unwrap())
    }
}

pub fn engine_config() -> EngineConfig {
    EngineConfig {
        order_stream_url: "ws://backend/ws/notifications".to_string(),
        chat_stream_url: "ws://backend/ws/chat".to_string(),
        handshake_timeout: Duration::from_secs(1),
        retry_backoff: Duration::from_millis(50),
        token_in_query: false,
        buffer_size: 16,
        rehydrate_interval: None,
    }
}

pub fn identity(user_id: &str, role: Role) -> UserIdentity {
    UserIdentity {
        user_id: user_id.to_string(),
        role,
        token: "token-1".to_string(),
    }
}

pub fn unread_event(id: &str, kind: NotificationKind) -> NotificationEvent {
    NotificationEvent {
        id: id.to_string(),
        kind,
        message: "notification".to_string(),
        related_order_id: None,
        related_conversation_id: None,
        timestamp_ms: 1,
        read: false,
    }
}

pub fn read_event(id: &str, kind: NotificationKind) -> NotificationEvent {
    NotificationEvent {
        read: true,
        ..unread_event(id, kind)
    }
}

pub async fn wait_for_view<F>(
    view: &mut watch::Receiver<AggregateView>,
    predicate: F,
) -> AggregateView
where
    F: Fn(&AggregateView) -> bool,
{
    timeout(Duration::from_secs(2), async {
        loop {
            {
                let current = view.borrow_and_update();
                if predicate(&current) {
                    return current.clone();
                }
            }
            view.changed().await.unwrap();
        }
    })
    .await
    .unwrap()
}
