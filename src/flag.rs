use std::sync::Once;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// One-shot broadcast flag.
///
/// The first call to [`Flag::set`] wins the gate, cancels the backing token
/// and thereby releases every current and future waiter. Concurrent callers
/// block until that transition is visible; every later call returns without
/// side effects.
#[derive(Debug)]
pub(crate) struct Flag {
    name: &'static str,
    fired: Once,
    token: CancellationToken,
}

impl Flag {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            fired: Once::new(),
            token: CancellationToken::new(),
        }
    }

    /// Returns `true` only for the caller that performed the transition.
    pub(crate) fn set(&self) -> bool {
        let mut won = false;
        self.fired.call_once(|| {
            self.token.cancel();
            debug!(flag = self.name, "shutdown flag signalled");
            won = true;
        });
        won
    }

    pub(crate) fn is_set(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn handle(&self) -> WaitHandle {
        WaitHandle {
            token: self.token.clone(),
        }
    }
}

/// Read-only view of a single shutdown flag.
///
/// Handles are cheap to clone and never consume the signal: every clone, and
/// every handle obtained before or after the flag fired, observes the same
/// one-way transition.
#[derive(Debug, Clone)]
pub struct WaitHandle {
    token: CancellationToken,
}

impl WaitHandle {
    /// Non-blocking snapshot of the flag.
    pub fn is_signalled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the flag is set. Returns immediately if it already is.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }

    /// Parks the current thread until the flag is set.
    ///
    /// Intended for plain threads; calling this from inside an async task
    /// blocks the runtime worker.
    pub fn wait_blocking(&self) {
        futures::executor::block_on(self.token.cancelled());
    }

    /// Waits for the flag for at most `timeout`, returning whether it fired.
    pub async fn wait_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait()).await.is_ok()
    }
}
