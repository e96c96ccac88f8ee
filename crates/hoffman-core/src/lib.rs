//! # hoffman-core: Pure Booking Logic for the Hoffman Booking Site
//!
//! This crate is the **heart** of the booking workspace. It contains the
//! booking domain as pure types and functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Hoffman Booking Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Booking Wizard (web)                         │   │
//! │  │  Services ─► Summary ─► Contact ─► Schedule ─► Confirm ─► Done │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 hoffman-store (Draft Store)                     │   │
//! │  │   add_service, set_contact_info, submit_booking, reset, ...     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ hoffman-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │  money  │ │ contact │ │validation│ │ wire   │  │   │
//! │  │   │ Service │ │  Money  │ │ key:val │ │  rules   │ │payload │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          hoffman-db (Document + Photo Store, SQLite)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Service, ArrivalWindow, TimeSlot, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`contact`] - Structured contact record and its `"key:value"` wire encoding
//! - [`photo`] - Image data-URI checks and decoding
//! - [`validation`] - Contact form rule table and payload validation
//! - [`catalog`] - The static service catalog
//! - [`wire`] - The payload handed to the persistence boundary
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use hoffman_core::catalog;
//! use hoffman_core::money::Money;
//!
//! let two_rooms = catalog::find_service("room-2").unwrap();
//! let rug = catalog::find_service("rug").unwrap();
//!
//! let total = two_rooms.price + rug.price;
//! assert_eq!(total, Money::from_cents(200_00));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod contact;
pub mod error;
pub mod money;
pub mod photo;
pub mod types;
pub mod validation;
pub mod wire;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use contact::{ContactField, ContactInfo};
pub use error::{BackendError, BookingError, CoreError, ErrorCode, ValidationError};
pub use money::Money;
pub use types::*;
pub use wire::{BookingBackend, BookingPayload};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum photo attachments allowed on a single booking draft.
pub const MAX_PHOTOS: usize = 10;

/// Number of days ahead the schedule step offers.
///
/// Dates beyond this horizon are still accepted, but produce a warning.
pub const BOOKING_HORIZON_DAYS: i64 = 14;

/// Storage key the draft is persisted under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "ab-booking-storage";
