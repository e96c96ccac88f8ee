//! # hoffman-app: Application Context
//!
//! Wires configuration, the document store, the notifier and the booking
//! draft store together.
//!
//! ## Module Organization
//! ```text
//! hoffman_app/
//! ├── lib.rs      ◄─── AppContext::bootstrap, init_tracing
//! ├── config.rs   ◄─── AppConfig (hoffman.toml + HOFFMAN_* env)
//! ├── email.rs    ◄─── EmailNotifier (HTTP email API)
//! └── error.rs    ◄─── AppError / ConfigError
//! ```

pub mod config;
pub mod email;
pub mod error;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use hoffman_db::{Database, DbConfig, LogNotifier, Notifier, SqliteBookingBackend};
use hoffman_store::{BookingStore, JsonFileStorage};

pub use config::AppConfig;
pub use email::EmailNotifier;
pub use error::{AppError, AppResult, ConfigError};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,hoffman=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=hoffman_store=trace` - Trace the draft store only
/// - Default: [`DEFAULT_LOG_FILTER`]
///
/// Calling it again once a subscriber is installed does nothing.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Everything a booking session needs, built once at startup.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Validate AppConfig                                                  │
/// │  2. Open SQLite (create parent dir, run migrations)                     │
/// │  3. Notifier: EmailNotifier if notifications.enabled, else LogNotifier  │
/// │  4. SqliteBookingBackend with the upload retry settings                 │
/// │  5. JsonFileStorage under the draft dir                                 │
/// │  6. BookingStore under storage_key, rehydrated                          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub struct AppContext {
    config: AppConfig,
    db: Database,
    backend: Arc<SqliteBookingBackend>,
    store: BookingStore,
}

impl AppContext {
    /// Builds the context from a loaded configuration.
    pub async fn bootstrap(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let db_path = config.database_path();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(ConfigError::from)?;
        }
        info!(path = %db_path.display(), "Opening booking database");

        let db = Database::new(
            DbConfig::new(db_path).max_connections(config.database.max_connections),
        )
        .await?;

        let notifier: Arc<dyn Notifier> = if config.notifications.enabled {
            info!("Email notifications enabled");
            Arc::new(EmailNotifier::new(config.notifications.clone())?)
        } else {
            info!("Email notifications disabled, logging new bookings");
            Arc::new(LogNotifier)
        };

        let backend = Arc::new(
            SqliteBookingBackend::with_notifier(db.clone(), notifier)
                .upload_config(config.uploads.into()),
        );

        let storage = Arc::new(JsonFileStorage::new(config.draft_dir()));
        let store = BookingStore::with_key(storage, backend.clone(), config.storage.storage_key.clone());
        store.rehydrate();

        info!(key = %config.storage.storage_key, "Booking store ready");

        Ok(AppContext {
            config,
            db,
            backend,
            store,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Booking backend, also used for admin operations.
    pub fn backend(&self) -> &SqliteBookingBackend {
        &self.backend
    }

    /// The session's draft store.
    pub fn store(&self) -> &BookingStore {
        &self.store
    }

    /// Closes the database pool.
    pub async fn shutdown(&self) {
        self.db.close().await;
    }
}
