//! Explicit cancellation for in-flight client operations

use tokio::sync::watch;

/// Triggers an abort observed by every clone of the paired [`AbortSignal`]
#[derive(Debug)]
pub struct AbortHandle {
    tx: watch::Sender<bool>,
}

/// Resolves once the paired [`AbortHandle`] aborts
///
/// Dropping the handle without aborting leaves the signal pending forever.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
}

/// Create a connected handle/signal pair
#[must_use]
pub fn abort_pair() -> (AbortHandle, AbortSignal) {
    let (tx, rx) = watch::channel(false);
    (AbortHandle { tx }, AbortSignal { rx })
}

impl AbortHandle {
    /// Abort every operation watching the paired signal
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }
}

impl AbortSignal {
    /// A signal that never fires
    #[must_use]
    pub fn never() -> Self {
        abort_pair().1
    }

    /// Whether the abort has already fired
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the abort fires
    pub async fn aborted(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|aborted| *aborted).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
