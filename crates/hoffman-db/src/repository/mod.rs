//! # Repository Module
//!
//! Database repositories for submitted bookings and their photos.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SqliteBookingBackend                                                   │
//! │       │                                                                 │
//! │       ├── db.photos().insert(&photo)     → photo id                     │
//! │       └── db.bookings().insert(&booking) → booking row                  │
//! │                                                                         │
//! │  BookingRepository            PhotoRepository                           │
//! │  ├── insert                   ├── insert                                │
//! │  ├── get_by_id                ├── get                                   │
//! │  ├── list                     ├── delete                                │
//! │  ├── update_status            └── storage_info                          │
//! │  └── delete                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod booking;
pub mod photo;
