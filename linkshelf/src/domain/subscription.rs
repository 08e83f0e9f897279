// linkshelf/src/domain/subscription.rs
use crate::domain::change::ChangeNotification;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Callback invoked for every change delivered to a subscription
pub type ChangeHandler = Arc<dyn Fn(ChangeNotification) + Send + Sync>;

type Release = Box<dyn FnOnce() + Send>;

/// Handle for a live change subscription.
///
/// Delivery continues while the handle is held. `cancel` stops delivery and
/// runs the release hook exactly once; further calls are no-ops. Dropping the
/// handle cancels it.
pub struct Subscription {
    id: u64,
    active: Arc<AtomicBool>,
    release: Mutex<Option<Release>>,
}

impl Subscription {
    /// `active` is shared with the delivering side, which must check it before each delivery.
    pub fn new(id: u64, active: Arc<AtomicBool>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id,
            active,
            release: Mutex::new(Some(Box::new(release))),
        }
    }

    /// A subscription that never delivers anything
    pub fn inactive(id: u64) -> Self {
        Self {
            id,
            active: Arc::new(AtomicBool::new(false)),
            release: Mutex::new(None),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        self.active.store(false, Ordering::SeqCst);
        let release = match self.release.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(release) = release {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
