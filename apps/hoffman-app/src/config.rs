//! # Application Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     HOFFMAN_DB_PATH=/srv/hoffman/hoffman.db                            │
//! │     HOFFMAN_EMAIL_API_KEY=re_...                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/hoffman-booking/hoffman.toml (Linux)                     │
//! │     ~/Library/Application Support/com.hoffman.booking/hoffman.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [storage]
//! draft_dir = "/var/lib/hoffman/drafts"
//! storage_key = "ab-booking-storage"
//!
//! [database]
//! path = "/var/lib/hoffman/hoffman.db"
//! max_connections = 5
//!
//! [notifications]
//! enabled = true
//! admin_email = "office@hoffmancleaning.com"
//! from = "onboarding@resend.dev"
//! api_key = "re_..."
//! api_base_url = "https://api.resend.com"
//!
//! [uploads]
//! attempts = 3
//! base_delay_ms = 1000
//! ```

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use hoffman_core::DEFAULT_STORAGE_KEY;
use hoffman_db::UploadConfig;

const CONFIG_FILE_NAME: &str = "hoffman.toml";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "hoffman", "booking")
}

// =============================================================================
// Sections
// =============================================================================

/// Where the in-progress draft is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory holding one JSON file per storage key.
    /// Default: `<data dir>/drafts`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_dir: Option<PathBuf>,

    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            draft_dir: None,
            storage_key: default_storage_key(),
        }
    }
}

/// Booking document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Default: `<data dir>/hoffman.db`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

/// New-booking email notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// When false, bookings are only logged.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_email: Option<String>,

    #[serde(default = "default_from")]
    pub from: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_from() -> String {
    "onboarding@resend.dev".to_string()
}

fn default_api_base_url() -> String {
    "https://api.resend.com".to_string()
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            enabled: false,
            admin_email: None,
            from: default_from(),
            api_key: None,
            api_base_url: default_api_base_url(),
        }
    }
}

/// Photo upload retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSettings {
    #[serde(default = "default_upload_attempts")]
    pub attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_upload_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

impl Default for UploadSettings {
    fn default() -> Self {
        UploadSettings {
            attempts: default_upload_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl From<UploadSettings> for UploadConfig {
    fn from(settings: UploadSettings) -> Self {
        UploadConfig {
            attempts: settings.attempts,
            base_delay: Duration::from_millis(settings.base_delay_ms),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub notifications: NotificationSettings,

    #[serde(default)]
    pub uploads: UploadSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (hoffman.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::SaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let key = &self.storage.storage_key;
        let key_ok = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
        if !key_ok {
            return Err(ConfigError::Invalid(format!(
                "storage_key must be a plain file name, got: {:?}",
                key
            )));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.uploads.attempts == 0 {
            return Err(ConfigError::Invalid(
                "upload attempts must be at least 1".into(),
            ));
        }

        let url = &self.notifications.api_base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "api_base_url must start with http:// or https://, got: {}",
                url
            )));
        }

        Ok(())
    }

    /// Applies `HOFFMAN_*` overrides read through `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = var("HOFFMAN_DRAFT_DIR") {
            self.storage.draft_dir = Some(PathBuf::from(dir));
        }

        if let Some(key) = var("HOFFMAN_STORAGE_KEY") {
            self.storage.storage_key = key;
        }

        if let Some(path) = var("HOFFMAN_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(max) = var("HOFFMAN_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring invalid HOFFMAN_DB_MAX_CONNECTIONS"),
            }
        }

        if let Some(enabled) = var("HOFFMAN_NOTIFICATIONS_ENABLED") {
            match enabled.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.notifications.enabled = true,
                "0" | "false" | "no" | "off" => self.notifications.enabled = false,
                _ => warn!(value = %enabled, "Unknown HOFFMAN_NOTIFICATIONS_ENABLED value"),
            }
        }

        if let Some(email) = var("HOFFMAN_ADMIN_EMAIL") {
            self.notifications.admin_email = Some(email);
        }

        if let Some(from) = var("HOFFMAN_EMAIL_FROM") {
            self.notifications.from = from;
        }

        if let Some(key) = var("HOFFMAN_EMAIL_API_KEY") {
            debug!("Overriding email API key from environment");
            self.notifications.api_key = Some(key);
        }

        if let Some(url) = var("HOFFMAN_EMAIL_API_URL") {
            self.notifications.api_base_url = url;
        }

        if let Some(attempts) = var("HOFFMAN_UPLOAD_ATTEMPTS") {
            match attempts.parse::<u32>() {
                Ok(n) => self.uploads.attempts = n,
                Err(_) => warn!(value = %attempts, "Ignoring invalid HOFFMAN_UPLOAD_ATTEMPTS"),
            }
        }

        if let Some(delay) = var("HOFFMAN_UPLOAD_BASE_DELAY_MS") {
            match delay.parse::<u64>() {
                Ok(ms) => self.uploads.base_delay_ms = ms,
                Err(_) => warn!(value = %delay, "Ignoring invalid HOFFMAN_UPLOAD_BASE_DELAY_MS"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Resolved Paths
    // =========================================================================

    /// Draft directory, falling back to the platform data dir.
    pub fn draft_dir(&self) -> PathBuf {
        self.storage.draft_dir.clone().unwrap_or_else(|| {
            project_dirs()
                .map(|dirs| dirs.data_dir().join("drafts"))
                .unwrap_or_else(|| PathBuf::from("drafts"))
        })
    }

    /// Database file, falling back to the platform data dir.
    pub fn database_path(&self) -> PathBuf {
        self.database.path.clone().unwrap_or_else(|| {
            project_dirs()
                .map(|dirs| dirs.data_dir().join("hoffman.db"))
                .unwrap_or_else(|| PathBuf::from("hoffman.db"))
        })
    }
}
