use crate::error::Error;
use async_trait::async_trait;
use futures::{Sink, Stream, StreamExt};
use std::pin::Pin;
use tokio_tungstenite::tungstenite::{self, Message};

pub type WsSink = Pin<Box<dyn Sink<Message, Error = tungstenite::Error> + Send>>;
pub type WsStream = Pin<Box<dyn Stream<Item = Result<Message, tungstenite::Error>> + Send>>;

///
/// Seam between the connection logic and the actual socket. Production
/// uses [TungsteniteTransport], tests substitute channel-backed halves.
///
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SocketTransport: Send + Sync {
    async fn dial(&self, url: &str) -> Result<(WsSink, WsStream), Error>;
}

pub struct TungsteniteTransport;

#[async_trait]
impl SocketTransport for TungsteniteTransport {
    async fn dial(&self, url: &str) -> Result<(WsSink, WsStream), Error> {
        let (socket, _response) = tokio_tungstenite::connect_async(url).await?;
        let (sink, stream) = socket.split();

        Ok((Box::pin(sink), Box::pin(stream)))
    }
}
