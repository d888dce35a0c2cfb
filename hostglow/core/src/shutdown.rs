//! Cooperative Shutdown
//!
//! A cloneable flag that background loops check once per iteration, and can
//! also await so a long sleep (retry backoff, idle interval) ends promptly.

use std::sync::Arc;

use tokio::sync::watch;

/// Shared shutdown flag
#[derive(Clone, Debug)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Create a signal in the "running" state
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Ask every holder to stop
    pub fn request(&self) {
        self.tx.send_replace(true);
    }

    /// Whether stop has been requested
    #[must_use]
    pub fn is_requested(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once stop has been requested
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        // The sender lives as long as `self`, so this only ends on a request
        let _ = rx.wait_for(|stop| *stop).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
