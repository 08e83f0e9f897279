// src/util/testing.rs

use std::env;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::notifier::RecordingNotifier;
use crate::application::services::bookmark_service::BookmarkService;
use crate::application::BookmarkServiceImpl;
use crate::config::{DB_URL_ENV, POLL_INTERVAL_ENV, USER_EMAIL_ENV, USER_ID_ENV, USER_NAME_ENV};
use crate::infrastructure::repositories::memory::InMemoryBookmarkRepository;

const GUARDED_VARS: [&str; 5] = [
    DB_URL_ENV,
    USER_ID_ENV,
    USER_EMAIL_ENV,
    USER_NAME_ENV,
    POLL_INTERVAL_ENV,
];

static TEST_ENV: OnceLock<()> = OnceLock::new();

/// Sets up test logging exactly once per process
pub fn init_test_env() {
    TEST_ENV.get_or_init(|| {
        setup_test_logging();
        info!("Test environment initialized");
    });
}

fn setup_test_logging() {
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
        return;
    }

    let noisy_modules = ["diesel", "r2d2", "mio"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    subscriber.try_init().unwrap_or_else(|e| {
        eprintln!("Error: Failed to set up logging: {}", e);
    });
}

/// Clears the `LINKSHELF_*` variables for the lifetime of the guard and
/// restores the previous values on drop. Combine with `#[serial]`.
#[derive(Debug, Clone)]
pub struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl Default for EnvGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvGuard {
    pub fn new() -> Self {
        let saved = GUARDED_VARS
            .iter()
            .map(|name| (*name, env::var(name).ok()))
            .collect();
        for name in GUARDED_VARS {
            env::remove_var(name);
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (name, value) in &self.saved {
            match value {
                Some(val) => env::set_var(name, val),
                None => env::remove_var(name),
            }
        }
    }
}

/// In-memory store, a service on top of it and a recording notifier
pub struct TestHarness {
    pub repository: Arc<InMemoryBookmarkRepository>,
    pub service: Arc<dyn BookmarkService>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_repository(InMemoryBookmarkRepository::new())
    }

    pub fn with_repository(repository: InMemoryBookmarkRepository) -> Self {
        init_test_env();
        let repository = Arc::new(repository);
        Self {
            service: Arc::new(BookmarkServiceImpl::new(repository.clone())),
            repository,
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn given_guard_when_dropped_then_variables_restored() {
        env::set_var(DB_URL_ENV, "/before.db");
        {
            let _guard = EnvGuard::new();
            assert!(env::var(DB_URL_ENV).is_err());
            env::set_var(DB_URL_ENV, "/inside.db");
        }
        assert_eq!(env::var(DB_URL_ENV).unwrap(), "/before.db");
        env::remove_var(DB_URL_ENV);
    }
}
