use crate::domain::bookmark::UserId;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::user::CurrentUser;
use crate::infrastructure::favicon::{FaviconService, DEFAULT_FAVICON_SERVICE, DEFAULT_FAVICON_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace, warn};

pub const DB_URL_ENV: &str = "LINKSHELF_DB_URL";
pub const USER_ID_ENV: &str = "LINKSHELF_USER_ID";
pub const USER_EMAIL_ENV: &str = "LINKSHELF_USER_EMAIL";
pub const USER_NAME_ENV: &str = "LINKSHELF_USER_NAME";
pub const POLL_INTERVAL_ENV: &str = "LINKSHELF_POLL_INTERVAL_MS";

/// The identity bookmarks are stored under
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct UserSettings {
    #[serde(default = "default_user_id")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

fn default_user_id() -> String {
    "local".to_string()
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            id: default_user_id(),
            email: None,
            name: None,
            avatar_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FaviconSettings {
    /// Image service queried with `?domain=<host>&sz=<size>`
    #[serde(default = "default_favicon_service")]
    pub service_url: String,

    #[serde(default = "default_favicon_size")]
    pub size: u32,
}

fn default_favicon_service() -> String {
    DEFAULT_FAVICON_SERVICE.to_string()
}

fn default_favicon_size() -> u32 {
    DEFAULT_FAVICON_SIZE
}

impl Default for FaviconSettings {
    fn default() -> Self {
        Self {
            service_url: default_favicon_service(),
            size: default_favicon_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Settings {
    /// Path to the SQLite database file
    #[serde(default = "default_db_path")]
    pub db_url: String,

    /// How often `watch` polls the change log, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    #[serde(default)]
    pub user: UserSettings,

    #[serde(default)]
    pub favicon: FaviconSettings,
}

fn default_db_path() -> String {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config/linkshelf/linkshelf.db")
        .to_string_lossy()
        .to_string()
}

fn default_poll_interval() -> u64 {
    500
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_url: default_db_path(),
            poll_interval_ms: default_poll_interval(),
            user: UserSettings::default(),
            favicon: FaviconSettings::default(),
        }
    }
}

impl Settings {
    pub fn current_user(&self) -> DomainResult<CurrentUser> {
        let mut user = CurrentUser::new(UserId::new(self.user.id.as_str())?);
        user.email = self.user.email.clone();
        user.display_name = self.user.name.clone();
        user.avatar_url = self.user.avatar_url.clone();
        Ok(user)
    }

    pub fn favicon_service(&self) -> FaviconService {
        FaviconService::new(self.favicon.service_url.as_str(), self.favicon.size)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".config/linkshelf/config.toml"))
}

fn read_config_file(path: &Path) -> DomainResult<Settings> {
    let text = std::fs::read_to_string(path)?;
    toml::from_str::<Settings>(&text).map_err(|e| {
        DomainError::Other(format!("Invalid configuration in {}: {}", path.display(), e))
    })
}

/// Load settings from a config file and environment variables.
///
/// An explicit `config_file` must exist and parse; the default location is
/// optional and a broken file there only produces a warning.
#[instrument(level = "debug")]
pub fn load_settings(config_file: Option<&Path>) -> DomainResult<Settings> {
    trace!("Loading settings");

    let mut settings = match config_file {
        Some(path) => read_config_file(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => read_config_file(&path).unwrap_or_else(|e| {
                warn!("Ignoring config file: {}", e);
                Settings::default()
            }),
            None => Settings::default(),
        },
    };

    if let Ok(db_url) = std::env::var(DB_URL_ENV) {
        trace!("Using {} from environment: {}", DB_URL_ENV, db_url);
        settings.db_url = db_url;
    }
    if let Ok(id) = std::env::var(USER_ID_ENV) {
        settings.user.id = id;
    }
    if let Ok(email) = std::env::var(USER_EMAIL_ENV) {
        settings.user.email = Some(email);
    }
    if let Ok(name) = std::env::var(USER_NAME_ENV) {
        settings.user.name = Some(name);
    }
    if let Ok(interval) = std::env::var(POLL_INTERVAL_ENV) {
        match interval.parse::<u64>() {
            Ok(ms) if ms > 0 => settings.poll_interval_ms = ms,
            _ => warn!("Ignoring invalid {}: {}", POLL_INTERVAL_ENV, interval),
        }
    }

    settings.db_url = shellexpand::tilde(&settings.db_url).to_string();

    debug!("Settings loaded: {:?}", settings);
    Ok(settings)
}

pub fn generate_default_config() -> String {
    let default_settings = Settings::default();
    toml::to_string_pretty(&default_settings)
        .unwrap_or_else(|_| "# Error generating default configuration".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::EnvGuard;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    fn create_temp_config_file(content: &str) -> (TempDir, PathBuf) {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, content).unwrap();
        (temp_dir, config_path)
    }

    #[test]
    #[serial]
    fn given_no_environment_when_load_then_defaults() {
        let _guard = EnvGuard::new();
        let settings = load_settings(None).unwrap();

        assert!(settings.db_url.ends_with("linkshelf.db"));
        assert_eq!(settings.poll_interval_ms, 500);
        assert_eq!(settings.favicon, FaviconSettings::default());
    }

    #[test]
    #[serial]
    fn given_config_file_when_load_then_values_used() {
        let _guard = EnvGuard::new();
        let (_dir, path) = create_temp_config_file(
            r#"
            db_url = "/config/file/path.db"
            poll_interval_ms = 250

            [user]
            id = "u-42"
            name = "Ada Lovelace"

            [favicon]
            size = 64
            "#,
        );

        let settings = load_settings(Some(&path)).unwrap();

        assert_eq!(settings.db_url, "/config/file/path.db");
        assert_eq!(settings.poll_interval_ms, 250);
        assert_eq!(settings.user.id, "u-42");
        assert_eq!(settings.favicon.size, 64);
        assert_eq!(settings.favicon.service_url, DEFAULT_FAVICON_SERVICE);
        assert_eq!(settings.current_user().unwrap().greeting_name(), "Ada");
    }

    #[test]
    #[serial]
    fn given_environment_when_load_then_overrides_config_file() {
        let _guard = EnvGuard::new();
        let (_dir, path) = create_temp_config_file("db_url = \"/config/non-override.db\"\n");
        env::set_var(DB_URL_ENV, "/env/override.db");
        env::set_var(USER_ID_ENV, "env-user");
        env::set_var(USER_EMAIL_ENV, "env@example.com");
        env::set_var(POLL_INTERVAL_ENV, "100");

        let settings = load_settings(Some(&path)).unwrap();

        assert_eq!(settings.db_url, "/env/override.db");
        assert_eq!(settings.user.id, "env-user");
        assert_eq!(settings.user.email.as_deref(), Some("env@example.com"));
        assert_eq!(settings.poll_interval_ms, 100);
    }

    #[test]
    #[serial]
    fn given_invalid_poll_interval_when_load_then_default_kept() {
        let _guard = EnvGuard::new();
        env::set_var(POLL_INTERVAL_ENV, "soon");
        assert_eq!(load_settings(None).unwrap().poll_interval_ms, 500);
    }

    #[test]
    #[serial]
    fn given_tilde_path_when_load_then_expanded() {
        let _guard = EnvGuard::new();
        env::set_var(DB_URL_ENV, "~/shelf.db");
        let settings = load_settings(None).unwrap();
        assert!(!settings.db_url.starts_with('~'));
        assert!(settings.db_url.ends_with("shelf.db"));
    }

    #[test]
    #[serial]
    fn given_broken_explicit_config_when_load_then_error() {
        let _guard = EnvGuard::new();
        let (_dir, path) = create_temp_config_file("db_url = [");
        assert!(load_settings(Some(&path)).is_err());
        assert!(load_settings(Some(Path::new("/nonexistent/linkshelf.toml"))).is_err());
    }

    #[test]
    fn given_blank_user_id_when_current_user_then_error() {
        let mut settings = Settings::default();
        settings.user.id = "  ".to_string();
        assert!(settings.current_user().is_err());
    }

    #[test]
    fn given_default_config_when_generated_then_parses_back() {
        let text = generate_default_config();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Settings::default());
        assert!(text.contains("[favicon]"));
    }
}
