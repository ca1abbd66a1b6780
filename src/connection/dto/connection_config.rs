use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// WebSocket endpoint of the stream, e.g. `wss://api.shop.example/ws/notifications`
    pub url: String,
    /// Idle window after which an unfinished handshake counts as failed
    pub handshake_timeout: Duration,
    /// Delay before the single reconnect attempt after an IO failure
    pub retry_backoff: Duration,
    /// Some deployments expect the token as a query parameter instead of
    /// a CONNECT header
    pub token_in_query: bool,
    /// Capacity of the inbound frame fan-out and the outbound queue
    pub buffer_size: usize,
}
