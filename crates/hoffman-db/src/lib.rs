//! # hoffman-db: Booking Document Store
//!
//! SQLite storage for submitted bookings and their photos, and the
//! [`SqliteBookingBackend`] the draft store submits through.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Booking Submission Path                            │
//! │                                                                         │
//! │  BookingStore::submit_booking (hoffman-store)                          │
//! │       │  BookingPayload                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     hoffman-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐   ┌───────────────┐   ┌──────────────┐    │   │
//! │  │   │ SqliteBooking  │   │ Repositories  │   │  Migrations  │    │   │
//! │  │   │ Backend        │──►│ BookingRepo   │   │  (embedded)  │    │   │
//! │  │   │ (backend.rs)   │   │ PhotoRepo     │   │ 001_initial  │    │   │
//! │  │   └───────┬────────┘   └───────┬───────┘   └──────────────┘    │   │
//! │  │           │                    │                                │   │
//! │  │           ▼                    ▼                                │   │
//! │  │      Notifier            Database (pool.rs)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (bookings, photos)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Booking and photo repositories
//! - [`backend`] - `BookingBackend` implementation and admin operations
//! - [`notify`] - New-booking notification hook
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hoffman_db::{Database, DbConfig, SqliteBookingBackend};
//!
//! let db = Database::new(DbConfig::new("hoffman.db")).await?;
//! let backend = SqliteBookingBackend::new(db);
//!
//! let id = backend.create_booking(payload).await?;
//! let recent = backend.list_bookings().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod error;
pub mod migrations;
pub mod notify;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{LinearBackoff, SqliteBookingBackend, UploadConfig};
pub use error::{DbError, DbResult};
pub use notify::{LogNotifier, NoOpNotifier, Notifier, NotifyError};
pub use pool::{Database, DbConfig};

pub use repository::booking::{Booking, BookingRepository};
pub use repository::photo::{PhotoRepository, StorageInfo, StoredPhoto};
