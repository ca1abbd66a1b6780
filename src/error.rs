#[derive(Debug, thiserror::Error)]
pub enum Error {
    ///
    /// Connecting without a token is refused before any socket is opened.
    /// No retry is scheduled for this error.
    ///
    #[error("missing auth token")]
    MissingToken,

    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    ///
    /// Token was rejected during the handshake.
    /// Unlike [Error::Transport] this error is never retried,
    /// caller is expected to trigger re-login.
    ///
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    #[error("handshake timed out")]
    HandshakeTimeout,

    #[error("decode error: {0}")]
    Decode(String),

    #[error("api error: {0}")]
    Api(#[from] reqwest::Error),

    ///
    /// This error should be returned only in situations
    /// that should never occur when system is setup correctly.
    ///
    #[error("unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}
