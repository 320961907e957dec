//! Shutdown coordination for the gateway.
//!
//! The flag is latched: a task that starts waiting after [`Shutdown::trigger`]
//! still sees it, so a signal arriving during startup is never lost.

use std::sync::Arc;

use tokio::sync::watch;

/// Latched shutdown flag shared by the server and the signal handler.
#[derive(Debug, Clone)]
pub struct Shutdown {
    flag: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self { flag: Arc::new(flag) }
    }

    /// Raise the flag. Idempotent.
    pub fn trigger(&self) {
        self.flag.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.flag.borrow()
    }

    /// Resolve once the flag is raised, immediately if it already is.
    pub async fn triggered(&self) {
        let mut rx = self.flag.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|raised| *raised).await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
