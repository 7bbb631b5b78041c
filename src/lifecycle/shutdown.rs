//! Shutdown coordination for the echo server.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// The server and the signal watcher share one broadcast channel: whoever
/// triggers first stops the accept loop, and in-flight requests drain.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// A cloneable handle that can trigger shutdown from another task.
    pub fn trigger_handle(&self) -> broadcast::Sender<()> {
        self.tx.clone()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once `rx` fires or every sender is gone.
pub async fn wait(mut rx: broadcast::Receiver<()>) {
    // Lagged and Closed both mean shutdown is due.
    let _ = rx.recv().await;
}
