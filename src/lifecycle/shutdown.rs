//! Graceful shutdown fan-out.

use std::future::Future;

use tokio::sync::broadcast;

/// One-shot stop notification shared by the server and background tasks.
///
/// Clones share the same channel; triggering any clone notifies every
/// subscriber.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver for [`HttpServer::run`](crate::HttpServer::run) and
    /// similar long-running loops.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Future resolving on the next trigger.
    ///
    /// Subscribes immediately, so a trigger fired after this call and before
    /// the first poll is not missed.
    pub fn signalled(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.subscribe();
        async move {
            let _ = rx.recv().await;
        }
    }

    /// Notify all current subscribers.
    pub fn trigger(&self) {
        let notified = self.tx.send(()).unwrap_or(0);
        tracing::info!(subscribers = notified, "Shutdown triggered");
    }

    /// Number of subscribers still listening.
    pub fn subscribers(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
