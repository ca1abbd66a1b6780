mod aggregator;
mod api;
mod auth;
mod broadcast;
mod connection;
mod dto;
mod engine;
mod error;
mod stomp;
mod store;
mod subscription;

pub use aggregator::{compute_view, CHAT_SUMMARY_FALLBACK_ID};
pub use api::{HttpApiConfig, HttpNotificationsApi, NotificationsApi};
pub use auth::{visible_to, Role};
pub use broadcast::{
    SignalPublisher, SignalReceiver, TabBroadcaster, TabBroadcasterConfig, TabEventKind, TabSignal,
    Unsubscribe,
};
pub use connection::{
    ConnectionConfig, SocketConnection, SocketTransport, StreamLink, TungsteniteTransport, WsSink,
    WsStream,
};
pub use dto::{
    input,
    output::{AggregateView, NotificationEvent},
    NotificationKind, StreamKind, UserIdentity,
};
pub use engine::{EngineConfig, SyncEngine};
pub use error::Error;
pub use stomp::{Command, Frame};
pub use store::StreamState;
pub use subscription::{topic_for, EventHandler, Subscription, SubscriptionRouter};
