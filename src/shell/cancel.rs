// Stop flag and the single-slot cancellation protocol shared with the signal handler.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Something a long-running command can be asked to abandon.
pub trait Cancel: Send + Sync {
    fn cancel(&self);
}

/// Cooperative stop request for the shell loop.
///
/// Cloning shares the flag, so the copy held by the signal handler and the
/// one owned by the session observe the same state.
#[derive(Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Atomic flag that commands poll while blocking.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Cancel for CancelToken {
    fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// The "current cancellable operation", at most one at a time.
#[derive(Clone, Default)]
pub struct CancelSlot(Arc<Mutex<Option<Arc<dyn Cancel>>>>);

impl CancelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `handle` until the returned guard is dropped.
    pub fn activate(&self, handle: Arc<dyn Cancel>) -> ActiveOperation {
        *self.lock() = Some(handle);
        ActiveOperation { slot: self.clone() }
    }

    /// Cancels the published operation, if there is one. Returns whether anything was cancelled.
    pub fn cancel_active(&self) -> bool {
        let active = self.lock().clone();
        match active {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    fn clear(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Arc<dyn Cancel>>> {
        // A poisoned slot only ever holds an Option, which is still consistent.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Registration guard returned by [`CancelSlot::activate`].
pub struct ActiveOperation {
    slot: CancelSlot,
}

impl Drop for ActiveOperation {
    fn drop(&mut self) {
        self.slot.clear();
    }
}
