use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use tokio::runtime::Handle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{trace, warn};

use crate::flag::{Flag, WaitHandle};

/// Shutdown signals owned by a single component.
///
/// Shutting down happens in two tiers of urgency. A soft stop asks the
/// component to finish what it is doing but not to commit to new work. A hard
/// stop asks it to release its resources and terminate as soon as possible,
/// and always implies a soft stop. Independently of both, the component
/// announces through has-stopped that it and everything it owns has
/// terminated.
///
/// Clones share the same state, so the owner can hand a clone to every task
/// that needs to observe or trigger the signals.
#[derive(Debug, Clone, Default)]
pub struct Signaller {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    soft_stop: Flag,
    hard_stop: Flag,
    has_stopped: Flag,
    watchers: Arc<AtomicUsize>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            soft_stop: Flag::new("soft-stop"),
            hard_stop: Flag::new("hard-stop"),
            has_stopped: Flag::new("has-stopped"),
            watchers: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Signaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the component stop at its own leisure: in-flight work
    /// may complete but no new work should start.
    pub fn trigger_soft_stop(&self) {
        self.inner.soft_stop.set();
    }

    /// Requests that the component stop right now regardless of in-flight
    /// work. Soft stop is triggered first.
    pub fn trigger_hard_stop(&self) {
        self.trigger_soft_stop();
        self.inner.hard_stop.set();
    }

    /// Announces, from the component itself, that it and all of its owned
    /// resources have terminated.
    pub fn trigger_has_stopped(&self) {
        self.inner.has_stopped.set();
    }

    pub fn is_soft_stop_signalled(&self) -> bool {
        self.inner.soft_stop.is_set()
    }

    pub fn is_hard_stop_signalled(&self) -> bool {
        self.inner.hard_stop.is_set()
    }

    pub fn is_has_stopped_signalled(&self) -> bool {
        self.inner.has_stopped.is_set()
    }

    /// Handle that fires on either a soft or a hard stop.
    pub fn soft_stop_handle(&self) -> WaitHandle {
        self.inner.soft_stop.handle()
    }

    pub fn hard_stop_handle(&self) -> WaitHandle {
        self.inner.hard_stop.handle()
    }

    pub fn has_stopped_handle(&self) -> WaitHandle {
        self.inner.has_stopped.handle()
    }

    /// Derives a child of `parent` that is additionally cancelled by a soft
    /// or hard stop.
    pub fn soft_stop_scope(&self, parent: &CancellationToken) -> (CancellationToken, Release) {
        self.derive_scope(parent, &self.inner.soft_stop)
    }

    /// Derives a child of `parent` that is additionally cancelled by a hard
    /// stop. A soft stop alone leaves it untouched.
    pub fn hard_stop_scope(&self, parent: &CancellationToken) -> (CancellationToken, Release) {
        self.derive_scope(parent, &self.inner.hard_stop)
    }

    /// Derives a child of `parent` that is additionally cancelled once the
    /// component reports it has stopped.
    pub fn has_stopped_scope(&self, parent: &CancellationToken) -> (CancellationToken, Release) {
        self.derive_scope(parent, &self.inner.has_stopped)
    }

    /// Number of derived-scope watchers that have not yet exited.
    pub fn active_watchers(&self) -> usize {
        self.inner.watchers.load(Ordering::Acquire)
    }

    fn derive_scope(&self, parent: &CancellationToken, flag: &Flag) -> (CancellationToken, Release) {
        let scope = parent.child_token();
        let watched = scope.clone();
        let signal = flag.handle();
        let name = flag.name();
        let registration = WatcherRegistration::new(Arc::clone(&self.inner.watchers));
        let fallback = signal.clone();

        let spawned = spawn_watcher(async move {
            let _registration = registration;
            trace!(flag = name, "scope watcher started");
            tokio::select! {
                biased;
                _ = watched.cancelled() => trace!(flag = name, "derived scope cancelled"),
                _ = signal.wait() => trace!(flag = name, "flag fired; cancelling derived scope"),
            }
            watched.cancel();
        });
        if !spawned {
            settle_unwatched(&scope, &fallback);
        }

        (scope.clone(), Release { scope })
    }
}

/// Explicit release for a derived scope.
///
/// Releasing cancels the derived scope (never its parent) and lets the
/// scope's watcher exit. It is safe to call any number of times, including
/// after the scope was already cancelled by its parent or by a signal.
/// Dropping a `Release` does nothing; use [`Release::into_guard`] to tie
/// the scope to a lexical lifetime instead.
///
/// Off a Tokio runtime each watcher needs its own thread. If the OS refuses
/// one, the scope still follows its parent and its release, and is cancelled
/// up front when the flag has already fired, but a later signal no longer
/// reaches it. A warning is logged when that happens.
#[derive(Debug, Clone)]
pub struct Release {
    scope: CancellationToken,
}

impl Release {
    pub fn release(&self) {
        self.scope.cancel();
    }

    /// Converts into a guard that releases the scope when dropped.
    pub fn into_guard(self) -> DropGuard {
        self.scope.drop_guard()
    }
}

struct WatcherRegistration {
    watchers: Arc<AtomicUsize>,
}

impl WatcherRegistration {
    fn new(watchers: Arc<AtomicUsize>) -> Self {
        watchers.fetch_add(1, Ordering::AcqRel);
        Self { watchers }
    }
}

impl Drop for WatcherRegistration {
    fn drop(&mut self) {
        self.watchers.fetch_sub(1, Ordering::AcqRel);
    }
}

// Outside a Tokio runtime the watcher gets its own thread so deriving a scope
// never fails. Returns whether the watcher is running.
fn spawn_watcher<F>(watcher: F) -> bool
where
    F: Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(watcher);
            true
        }
        Err(_) => {
            let spawned = thread::Builder::new()
                .name("scope-watcher".into())
                .spawn(move || futures::executor::block_on(watcher));
            match spawned {
                Ok(_) => true,
                Err(err) => {
                    warn!("failed to spawn scope watcher thread; scope will not follow the flag: {err}");
                    false
                }
            }
        }
    }
}

fn settle_unwatched(scope: &CancellationToken, signal: &WaitHandle) {
    if signal.is_signalled() {
        scope.cancel();
    }
}
