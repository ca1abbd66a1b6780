use crate::stomp::Frame;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

///
/// Cheap handle to a [super::SocketConnection]'s channel ends.
/// Subscriptions hold one of these instead of the connection itself, so
/// the connection stays solely owned by whoever tears it down.
///
#[derive(Clone)]
pub struct StreamLink {
    outbound: mpsc::Sender<Frame>,
    frames: broadcast::Sender<Arc<Frame>>,
    connected: watch::Receiver<bool>,
}

impl StreamLink {
    pub(crate) fn new(
        outbound: mpsc::Sender<Frame>,
        frames: broadcast::Sender<Arc<Frame>>,
        connected: watch::Receiver<bool>,
    ) -> Self {
        Self {
            outbound,
            frames,
            connected,
        }
    }

    pub fn sender(&self) -> mpsc::Sender<Frame> {
        self.outbound.clone()
    }

    pub fn frames(&self) -> broadcast::Receiver<Arc<Frame>> {
        self.frames.subscribe()
    }

    pub fn connected(&self) -> watch::Receiver<bool> {
        self.connected.clone()
    }
}
