//! # SQLite Booking Backend
//!
//! [`BookingBackend`] implementation over the booking and photo tables,
//! plus the admin operations on the same store.
//!
//! ## createBooking Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_booking(payload)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_booking_payload ──✗──► BackendError::Validation               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  for each photo:                                                        │
//! │     not an image data-URI ──► skip (warn)                               │
//! │     insert ──✗──► sleep(base × attempt) ──► retry ... ──► skip (error)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  bookings.insert { status: pending, photo_ids }                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  notifier.booking_created ──✗──► logged only                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Ok(id)                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backoff::backoff::Backoff;
use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use hoffman_core::photo::{is_uploadable, PhotoData};
use hoffman_core::types::calendar_date;
use hoffman_core::validation::validate_booking_payload;
use hoffman_core::wire::{BookingBackend, BookingPayload};
use hoffman_core::{BackendError, BookingStatus};

use crate::notify::{LogNotifier, Notifier};
use crate::pool::Database;
use crate::repository::booking::Booking;
use crate::repository::photo::{StorageInfo, StoredPhoto};

// =============================================================================
// Upload Retry
// =============================================================================

/// Photo upload retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadConfig {
    /// Total attempts per photo, including the first.
    /// Default: 3
    pub attempts: u32,

    /// Delay unit; attempt `n` waits `base_delay × n` before the next try.
    /// Default: 1 second
    pub base_delay: Duration,
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// Linear backoff: `base`, `2 × base`, ... until `attempts` are used up.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    base: Duration,
    attempts: u32,
    attempt: u32,
}

impl LinearBackoff {
    pub fn new(config: UploadConfig) -> Self {
        LinearBackoff {
            base: config.base_delay,
            attempts: config.attempts.max(1),
            attempt: 0,
        }
    }
}

impl Backoff for LinearBackoff {
    fn reset(&mut self) {
        self.attempt = 0;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.attempts {
            return None;
        }
        Some(self.base * self.attempt)
    }
}

// =============================================================================
// Backend
// =============================================================================

/// Booking backend storing documents and photos in SQLite.
#[derive(Clone)]
pub struct SqliteBookingBackend {
    db: Database,
    notifier: Arc<dyn Notifier>,
    upload: UploadConfig,
}

impl SqliteBookingBackend {
    /// Creates a backend that logs new bookings.
    pub fn new(db: Database) -> Self {
        Self::with_notifier(db, Arc::new(LogNotifier))
    }

    /// Creates a backend with a custom notifier.
    pub fn with_notifier(db: Database, notifier: Arc<dyn Notifier>) -> Self {
        SqliteBookingBackend {
            db,
            notifier,
            upload: UploadConfig::default(),
        }
    }

    /// Overrides the photo upload retry settings.
    pub fn upload_config(mut self, upload: UploadConfig) -> Self {
        self.upload = upload;
        self
    }

    /// Underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Uploads every valid photo, returning the stored ids in order.
    async fn upload_photos(&self, photos: &[String]) -> Vec<String> {
        let mut ids = Vec::with_capacity(photos.len());

        for (index, uri) in photos.iter().enumerate() {
            if !is_uploadable(uri) {
                warn!(index, "Skipping photo with unsupported data-URI");
                continue;
            }

            let data = match PhotoData::parse(uri) {
                Ok(data) => data,
                Err(e) => {
                    warn!(index, error = %e, "Skipping undecodable photo");
                    continue;
                }
            };

            if let Some(id) = self.upload_photo(index, &data).await {
                ids.push(id);
            }
        }

        ids
    }

    async fn upload_photo(&self, index: usize, data: &PhotoData) -> Option<String> {
        let mut backoff = LinearBackoff::new(self.upload);
        let mut attempt = 1u32;

        loop {
            match self.db.photos().insert(data).await {
                Ok(id) => {
                    debug!(index, attempt, photo_id = %id, "Photo uploaded");
                    return Some(id);
                }
                Err(e) => {
                    warn!(index, attempt, error = %e, "Photo upload failed");
                }
            }

            match backoff.next_backoff() {
                Some(delay) => {
                    debug!(?delay, attempt, "Waiting before photo upload retry");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    error!(index, attempts = attempt, "Giving up on photo upload");
                    return None;
                }
            }
        }
    }

    // =========================================================================
    // Admin Operations
    // =========================================================================

    /// All bookings, newest first.
    pub async fn list_bookings(&self) -> Result<Vec<Booking>, BackendError> {
        Ok(self.db.bookings().list().await?)
    }

    /// A booking by id.
    pub async fn get_booking(&self, id: &str) -> Result<Booking, BackendError> {
        self.db
            .bookings()
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found("Booking", id))
    }

    /// Confirms or cancels a booking. `pending` is not a valid target.
    pub async fn update_booking_status(
        &self,
        id: &str,
        status: BookingStatus,
    ) -> Result<Booking, BackendError> {
        if status == BookingStatus::Pending {
            return Err(BackendError::Validation(format!(
                "Invalid status: {}. Must be confirmed or cancelled",
                status
            )));
        }

        let booking = self.db.bookings().update_status(id, status).await?;
        info!(id = %id, status = %status, "Booking status updated");
        Ok(booking)
    }

    /// Deletes a booking and, best-effort, its photos.
    pub async fn delete_booking(&self, id: &str) -> Result<(), BackendError> {
        let booking = self.get_booking(id).await?;

        let photos = self.db.photos();
        for photo_id in &booking.photo_ids {
            if let Err(e) = photos.delete(photo_id).await {
                warn!(booking = %id, photo = %photo_id, error = %e, "Failed to delete photo");
            }
        }

        self.db.bookings().delete(id).await?;
        info!(id = %id, photos = booking.photo_ids.len(), "Booking deleted");
        Ok(())
    }

    /// A stored photo by id.
    pub async fn photo(&self, id: &str) -> Result<StoredPhoto, BackendError> {
        self.db
            .photos()
            .get(id)
            .await?
            .ok_or_else(|| not_found("Photo", id))
    }

    /// Photo file count and total size.
    pub async fn storage_info(&self) -> Result<StorageInfo, BackendError> {
        Ok(self.db.photos().storage_info().await?)
    }
}

fn not_found(entity: &str, id: &str) -> BackendError {
    BackendError::NotFound {
        entity: entity.to_string(),
        id: id.to_string(),
    }
}

#[async_trait]
impl BookingBackend for SqliteBookingBackend {
    async fn create_booking(&self, payload: BookingPayload) -> Result<String, BackendError> {
        validate_booking_payload(&payload)?;

        let arrival_date =
            calendar_date::parse(&payload.arrival_window.date).map_err(BackendError::Validation)?;

        let photo_ids = self.upload_photos(&payload.photos).await;
        if photo_ids.len() < payload.photos.len() {
            warn!(
                requested = payload.photos.len(),
                stored = photo_ids.len(),
                "Some photos were not stored"
            );
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            services: payload.services,
            contact_info: payload.contact_info,
            arrival_date,
            arrival_time: payload.arrival_window.time,
            additional_details: payload.additional_details.unwrap_or_default(),
            photo_ids,
            status: BookingStatus::Pending,
            total: payload.total,
            created_at: now,
            updated_at: now,
        };

        self.db.bookings().insert(&booking).await?;
        info!(
            id = %booking.id,
            services = booking.services.len(),
            photos = booking.photo_ids.len(),
            total = %booking.total,
            "Booking created"
        );

        if let Err(e) = self.notifier.booking_created(&booking).await {
            error!(id = %booking.id, error = %e, "Failed to send booking notification");
        }

        Ok(booking.id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NoOpNotifier, NotifyError};
    use crate::pool::DbConfig;
    use hoffman_core::wire::{WireArrivalWindow, WireService};
    use hoffman_core::Money;
    use std::sync::Mutex;

    const PIXEL: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[derive(Default)]
    struct RecordingNotifier {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn booking_created(&self, booking: &Booking) -> Result<(), NotifyError> {
            self.seen.lock().unwrap().push(booking.id.clone());
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn booking_created(&self, _booking: &Booking) -> Result<(), NotifyError> {
            Err(NotifyError::Delivery("smtp down".into()))
        }
    }

    fn payload() -> BookingPayload {
        BookingPayload {
            services: vec![WireService {
                id: "sofa".into(),
                name: "Sofa".into(),
                price: Money::from_cents(12_500),
                quantity: 1,
            }],
            contact_info: vec![
                "name:Ada Byron".into(),
                "email:ada@example.com".into(),
                "phone:555-123-4567".into(),
                "address:1 Main St".into(),
            ],
            arrival_window: WireArrivalWindow {
                date: "2024-06-01".into(),
                time: "9:00am - 12:00pm".into(),
            },
            additional_details: Some("Gate code 42".into()),
            photos: vec![],
            total: Money::from_cents(12_500),
        }
    }

    async fn backend_with(notifier: Arc<dyn Notifier>) -> SqliteBookingBackend {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        SqliteBookingBackend::with_notifier(db, notifier).upload_config(UploadConfig {
            attempts: 2,
            base_delay: Duration::from_millis(1),
        })
    }

    #[test]
    fn test_linear_backoff_schedule() {
        let mut backoff = LinearBackoff::new(UploadConfig {
            attempts: 3,
            base_delay: Duration::from_millis(100),
        });
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(100)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(200)));
        assert_eq!(backoff.next_backoff(), None);

        backoff.reset();
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn test_create_booking_stores_document_and_notifies() {
        let notifier = Arc::new(RecordingNotifier::default());
        let backend = backend_with(notifier.clone()).await;

        let id = backend.create_booking(payload()).await.unwrap();

        let booking = backend.get_booking(&id).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.total, Money::from_cents(12_500));
        assert_eq!(booking.additional_details, "Gate code 42");
        assert_eq!(booking.arrival_date.to_string(), "2024-06-01");
        assert_eq!(*notifier.seen.lock().unwrap(), vec![id]);
    }

    #[tokio::test]
    async fn test_invalid_payload_is_rejected() {
        let backend = backend_with(Arc::new(NoOpNotifier)).await;
        let mut bad = payload();
        bad.services.clear();
        bad.contact_info = vec!["name:Ada".into(), "email:nope".into()];

        let err = backend.create_booking(bad).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: At least one service must be selected, \
             Contact phone is required, Invalid email format"
        );
        assert!(backend.list_bookings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_photos_are_skipped() {
        let backend = backend_with(Arc::new(NoOpNotifier)).await;
        let mut with_photos = payload();
        with_photos.photos = vec![
            PIXEL.into(),
            "data:image/bmp;base64,Qk0=".into(),
            "https://example.com/a.png".into(),
            PIXEL.into(),
        ];

        let id = backend.create_booking(with_photos).await.unwrap();
        let booking = backend.get_booking(&id).await.unwrap();
        assert_eq!(booking.photo_ids.len(), 2);

        let photo = backend.photo(&booking.photo_ids[0]).await.unwrap();
        assert_eq!(photo.mime_type, "image/png");

        let info = backend.storage_info().await.unwrap();
        assert_eq!(info.file_count, 2);
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_fail_booking() {
        let backend = backend_with(Arc::new(FailingNotifier)).await;
        let id = backend.create_booking(payload()).await.unwrap();
        assert!(backend.get_booking(&id).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_booking_status() {
        let backend = backend_with(Arc::new(NoOpNotifier)).await;
        let id = backend.create_booking(payload()).await.unwrap();

        let booking = backend
            .update_booking_status(&id, BookingStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);

        assert!(matches!(
            backend.update_booking_status(&id, BookingStatus::Pending).await,
            Err(BackendError::Validation(_))
        ));
        assert!(matches!(
            backend.update_booking_status("missing", BookingStatus::Confirmed).await,
            Err(BackendError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_booking_removes_photos() {
        let backend = backend_with(Arc::new(NoOpNotifier)).await;
        let mut with_photo = payload();
        with_photo.photos = vec![PIXEL.into()];
        let id = backend.create_booking(with_photo).await.unwrap();
        let photo_id = backend.get_booking(&id).await.unwrap().photo_ids[0].clone();

        backend.delete_booking(&id).await.unwrap();

        assert!(matches!(
            backend.get_booking(&id).await,
            Err(BackendError::NotFound { .. })
        ));
        assert!(matches!(
            backend.photo(&photo_id).await,
            Err(BackendError::NotFound { .. })
        ));
        assert!(matches!(
            backend.delete_booking(&id).await,
            Err(BackendError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_bookings_newest_first() {
        let backend = backend_with(Arc::new(NoOpNotifier)).await;
        let first = backend.create_booking(payload()).await.unwrap();
        let second = backend.create_booking(payload()).await.unwrap();

        let ids: Vec<String> = backend
            .list_bookings()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec![second, first]);
    }
}
