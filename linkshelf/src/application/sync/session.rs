// src/application/sync/session.rs
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver};
use tracing::{debug, error, instrument, warn};

use crate::application::error::ApplicationResult;
use crate::application::notifier::Notifier;
use crate::application::services::bookmark_service::BookmarkService;
use crate::application::sync::list_state::{ListState, SyncPhase};
use crate::domain::bookmark::UserId;
use crate::domain::change::ChangeNotification;
use crate::domain::subscription::{ChangeHandler, Subscription};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load bookmarks";

/// One live list view: owns the subscription and the list state.
///
/// The subscription callback only enqueues; changes are applied one at a
/// time by whoever drives the session (`process_pending`, `recv` + `apply`).
#[derive(Debug)]
pub struct ListSession {
    service: Arc<dyn BookmarkService>,
    notifier: Arc<dyn Notifier>,
    user_id: UserId,
    state: ListState,
    subscription: Option<Subscription>,
    receiver: Option<UnboundedReceiver<ChangeNotification>>,
}

impl ListSession {
    pub fn new(
        service: Arc<dyn BookmarkService>,
        notifier: Arc<dyn Notifier>,
        user_id: UserId,
    ) -> Self {
        Self {
            service,
            notifier,
            user_id,
            state: ListState::new(),
            subscription: None,
            receiver: None,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn phase(&self) -> &SyncPhase {
        self.state.phase()
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// Subscribe, then fetch. Errors end in the `Failed` phase and a toast.
    #[instrument(skip(self), fields(user_id = %self.user_id), level = "debug")]
    pub fn activate(&mut self) {
        if self.is_active() {
            self.deactivate();
        }
        self.state.begin_loading();

        let (sender, receiver) = mpsc::unbounded_channel();
        let handler: ChangeHandler = Arc::new(move |change| {
            if sender.send(change).is_err() {
                debug!("List session gone, dropping change");
            }
        });

        match self.service.subscribe_to_changes(&self.user_id, handler) {
            Ok(subscription) => {
                self.subscription = Some(subscription);
                self.receiver = Some(receiver);
            }
            Err(e) => {
                error!("Failed to subscribe to bookmark changes: {}", e);
                self.state.fail(e.to_string());
                self.notifier.error(LOAD_FAILED_MESSAGE);
                return;
            }
        }

        match self.service.list_bookmarks(&self.user_id) {
            Ok(rows) => {
                // Anything delivered during the fetch goes through the buffer
                self.process_pending();
                self.state.seed(rows);
                debug!("List ready with {} bookmarks", self.state.list().len());
            }
            Err(e) => {
                error!("Failed to fetch bookmarks: {}", e);
                self.state.fail(e.to_string());
                self.notifier.error(LOAD_FAILED_MESSAGE);
            }
        }
    }

    /// Apply one change; returns true if the visible list changed
    pub fn apply(&mut self, change: ChangeNotification) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state.receive(change)
    }

    /// Apply every change already queued, in arrival order
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let Some(receiver) = self.receiver.as_mut() else {
                break;
            };
            match receiver.try_recv() {
                Ok(change) => {
                    self.state.receive(change);
                    applied += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// Ask the store for new changes and apply them
    pub fn sync(&mut self) -> ApplicationResult<usize> {
        if !self.is_active() {
            return Ok(0);
        }
        if let Err(e) = self.service.pump_changes() {
            warn!("Failed to poll bookmark changes: {}", e);
            return Err(e);
        }
        Ok(self.process_pending())
    }

    /// Wait for the next queued change. Returns `None` once deactivated.
    pub async fn recv(&mut self) -> Option<ChangeNotification> {
        match self.receiver.as_mut() {
            Some(receiver) => receiver.recv().await,
            None => None,
        }
    }

    /// Cancel the subscription and stop applying changes. Safe to call repeatedly.
    pub fn deactivate(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
            debug!("Deactivated list session for {}", self.user_id);
        }
        self.receiver = None;
        self.state.deactivate();
    }
}

impl Drop for ListSession {
    fn drop(&mut self) {
        self.deactivate();
    }
}
