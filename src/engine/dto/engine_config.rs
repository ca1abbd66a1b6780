use std::time::Duration;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub order_stream_url: String,
    pub chat_stream_url: String,

    pub handshake_timeout: Duration,
    pub retry_backoff: Duration,
    pub token_in_query: bool,
    pub buffer_size: usize,

    /// Interval of the REST reconciliation pass that corrects drift
    /// between socket increments and server state. [None] disables it.
    pub rehydrate_interval: Option<Duration>,
}
