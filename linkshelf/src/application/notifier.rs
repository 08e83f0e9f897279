// src/application/notifier.rs
use std::fmt::{self, Debug};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToastKind::Success => f.write_str("success"),
            ToastKind::Error => f.write_str("error"),
            ToastKind::Info => f.write_str("info"),
        }
    }
}

/// Sink for short-lived user notifications ("toasts")
pub trait Notifier: Send + Sync + Debug {
    fn notify(&self, kind: ToastKind, message: &str);

    fn success(&self, message: &str) {
        self.notify(ToastKind::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(ToastKind::Error, message);
    }

    fn info(&self, message: &str) {
        self.notify(ToastKind::Info, message);
    }
}

/// Keeps every toast in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<(ToastKind, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<(ToastKind, String)> {
        match self.toasts.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<(ToastKind, String)> {
        self.toasts().pop()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: ToastKind, message: &str) {
        let mut toasts = match self.toasts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        toasts.push((kind, message.to_string()));
    }
}
