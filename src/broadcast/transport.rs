use super::dto::TabSignal;
use anyhow::anyhow;
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, OnceLock},
};
use tokio::sync::{broadcast, watch};

///
/// Publishing half of a tab signaling transport.
///
pub trait SignalPublisher: Send + Sync {
    fn publish(&self, signal: TabSignal);

    /// Releases process-wide resources held for the channel
    fn detach(&self) {}
}

///
/// Receiving half of a tab signaling transport. Returns [None] once the
/// channel is gone for good.
///
#[async_trait]
pub trait SignalReceiver: Send {
    async fn recv(&mut self) -> Option<TabSignal>;
}

// Process-wide registries keyed by channel name, the same-origin scope
// of the browser mechanisms they stand in for. Explicit init/destroy on
// the broadcaster bounds their lifetime.
static PRIMARY_CHANNELS: OnceLock<Mutex<HashMap<String, broadcast::Sender<TabSignal>>>> =
    OnceLock::new();
static FALLBACK_CHANNELS: OnceLock<Mutex<HashMap<String, watch::Sender<Option<TabSignal>>>>> =
    OnceLock::new();

///
/// Attaches to the primary transport: a named broadcast channel.
///
/// ### Errors
/// Returns an error when the channel registry is unavailable, the
/// equivalent of running on a browser without the primary mechanism.
/// Callers fall back to [attach_fallback].
///
pub fn attach_primary(
    channel: &str,
) -> Result<(Arc<dyn SignalPublisher>, Box<dyn SignalReceiver>), crate::error::Error> {
    let registry = PRIMARY_CHANNELS.get_or_init(Default::default);
    let mut channels = registry
        .lock()
        .map_err(|_| anyhow!("tab channel registry unavailable"))?;

    let tx = channels
        .entry(channel.to_string())
        .or_insert_with(|| broadcast::channel(32).0)
        .clone();
    let rx = tx.subscribe();

    Ok((
        Arc::new(PrimaryPublisher {
            channel: channel.to_string(),
            tx,
        }),
        Box::new(PrimaryReceiver { rx }),
    ))
}

///
/// Attaches to the fallback transport: a named last-written-value cell
/// with change signaling. Observably identical to the primary from the
/// subscriber's point of view.
///
pub fn attach_fallback(channel: &str) -> (Arc<dyn SignalPublisher>, Box<dyn SignalReceiver>) {
    let registry = FALLBACK_CHANNELS.get_or_init(Default::default);
    let tx = match registry.lock() {
        Ok(mut channels) => channels
            .entry(channel.to_string())
            .or_insert_with(|| watch::channel(None).0)
            .clone(),
        // registry poisoned: signal only within this attachment
        Err(_) => watch::channel(None).0,
    };
    let rx = tx.subscribe();

    (
        Arc::new(FallbackPublisher { tx }),
        Box::new(FallbackReceiver { rx }),
    )
}

struct PrimaryPublisher {
    channel: String,
    tx: broadcast::Sender<TabSignal>,
}

impl SignalPublisher for PrimaryPublisher {
    fn publish(&self, signal: TabSignal) {
        // no sibling tab listening is not an error
        let _ = self.tx.send(signal);
    }

    fn detach(&self) {
        let Some(registry) = PRIMARY_CHANNELS.get() else {
            return;
        };
        let Ok(mut channels) = registry.lock() else {
            return;
        };

        if self.tx.receiver_count() == 0 {
            channels.remove(&self.channel);
        }
    }
}

struct PrimaryReceiver {
    rx: broadcast::Receiver<TabSignal>,
}

#[async_trait]
impl SignalReceiver for PrimaryReceiver {
    async fn recv(&mut self) -> Option<TabSignal> {
        loop {
            match self.rx.recv().await {
                Ok(signal) => return Some(signal),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    // best-effort delivery, skipping is allowed
                    tracing::warn!(count, "tab channel lagged, signals skipped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

struct FallbackPublisher {
    tx: watch::Sender<Option<TabSignal>>,
}

impl SignalPublisher for FallbackPublisher {
    fn publish(&self, signal: TabSignal) {
        self.tx.send_replace(Some(signal));
    }
}

struct FallbackReceiver {
    rx: watch::Receiver<Option<TabSignal>>,
}

#[async_trait]
impl SignalReceiver for FallbackReceiver {
    async fn recv(&mut self) -> Option<TabSignal> {
        loop {
            self.rx.changed().await.ok()?;
            let signal = self.rx.borrow_and_update().clone();
            if let Some(signal) = signal {
                return Some(signal);
            }
        }
    }
}
