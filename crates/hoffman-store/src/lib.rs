//! # hoffman-store: Booking Draft Store
//!
//! Holds the in-progress booking across the wizard steps, validates it and
//! drives its submission to a [`hoffman_core::BookingBackend`].
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          hoffman-store                                  │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  BookingStore (store.rs)                                         │  │
//! │  │  Mutex<BookingDraft> · watch<rehydrated> · watch<version>        │  │
//! │  └───────┬──────────────────────────┬──────────────────────┬────────┘  │
//! │          │                          │                      │           │
//! │  ┌───────▼────────┐   ┌─────────────▼──────────┐  ┌────────▼────────┐  │
//! │  │ BookingDraft   │   │ DraftStorage           │  │ BookingBackend  │  │
//! │  │ (draft.rs)     │   │ (persist.rs)           │  │ (hoffman-core)  │  │
//! │  │ pure mutators, │   │ MemoryStorage,         │  │ create_booking  │  │
//! │  │ validation     │   │ JsonFileStorage        │  │                 │  │
//! │  └────────────────┘   └────────────────────────┘  └─────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let store = BookingStore::open(storage, backend);
//! store.wait_rehydrated().await;
//!
//! store.add_service(catalog::find_service("room-2").unwrap());
//! store.set_contact_info(contact);
//! store.set_arrival_window(window);
//!
//! let booking_id = store.submit_booking().await?;
//! store.reset(true);
//! ```

pub mod draft;
pub mod error;
pub mod persist;
pub mod store;

pub use draft::{BookingDraft, DebugInfo};
pub use error::{StoreError, StoreResult};
pub use persist::{DraftStorage, JsonFileStorage, MemoryStorage};
pub use store::BookingStore;
