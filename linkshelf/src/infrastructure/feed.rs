// linkshelf/src/infrastructure/feed.rs
use crate::domain::bookmark::UserId;
use crate::domain::change::ChangeNotification;
use crate::domain::subscription::{ChangeHandler, Subscription};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::{debug, instrument, trace, warn};

struct Subscriber {
    id: u64,
    user_id: UserId,
    /// Only changes with a sequence number above this are delivered
    since: i64,
    active: Arc<AtomicBool>,
    handler: ChangeHandler,
}

#[derive(Default)]
struct FeedInner {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl FeedInner {
    fn subscribers(&self) -> MutexGuard<'_, Vec<Subscriber>> {
        match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// In-process fan-out of store change payloads to per-user subscriptions.
///
/// Raw payloads are decoded into [`ChangeNotification`] here, at the boundary;
/// payloads that do not decode are logged and dropped.
#[derive(Clone, Default)]
pub struct ChangeFeed {
    inner: Arc<FeedInner>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip(self, handler), level = "debug")]
    pub fn subscribe(&self, user_id: &UserId, since: i64, handler: ChangeHandler) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let active = Arc::new(AtomicBool::new(true));

        self.inner.subscribers().push(Subscriber {
            id,
            user_id: user_id.clone(),
            since,
            active: active.clone(),
            handler,
        });
        debug!("Subscription {} registered for user {}", id, user_id);

        let feed: Weak<FeedInner> = Arc::downgrade(&self.inner);
        Subscription::new(id, active, move || {
            if let Some(feed) = feed.upgrade() {
                feed.subscribers().retain(|s| s.id != id);
                debug!("Subscription {} released", id);
            }
        })
    }

    /// Decode `raw` and deliver it to the owner's subscriptions registered before `seq`.
    /// Returns the number of handlers invoked.
    #[instrument(skip(self, raw), level = "trace")]
    pub fn dispatch(&self, seq: i64, user_id: &UserId, raw: &str) -> usize {
        let change = match ChangeNotification::try_from(raw) {
            Ok(change) => change,
            Err(e) => {
                warn!("Dropping change #{} for user {}: {}", seq, user_id, e);
                return 0;
            }
        };
        self.deliver(seq, user_id, change)
    }

    /// Deliver an already decoded change
    pub fn deliver(&self, seq: i64, user_id: &UserId, change: ChangeNotification) -> usize {
        // Handlers run outside the lock so they may cancel their own subscription.
        let targets: Vec<(Arc<AtomicBool>, ChangeHandler)> = self
            .inner
            .subscribers()
            .iter()
            .filter(|s| &s.user_id == user_id && s.since < seq)
            .map(|s| (s.active.clone(), s.handler.clone()))
            .collect();

        let mut delivered = 0;
        for (active, handler) in targets {
            if active.load(Ordering::SeqCst) {
                trace!("Delivering change #{}: {}", seq, change);
                handler(change.clone());
                delivered += 1;
            }
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers().len()
    }
}

impl fmt::Debug for ChangeFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeFeed")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
