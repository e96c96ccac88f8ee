//! # Booking Store
//!
//! The session-wide owner of the booking draft.
//!
//! ## Thread Safety
//! The draft sits behind a `Mutex`. Every mutator takes the lock, edits the
//! draft, persists it and releases the lock before returning, so mutations
//! never interleave. Submission holds the lock only to check-and-set
//! `is_submitting` and to record the outcome; it never holds it across the
//! backend call.
//!
//! ## Submission Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  submit_booking()                                                       │
//! │                                                                         │
//! │  lock ─► is_submitting? ──yes──► Err(SubmissionInProgress)             │
//! │            │ no                                                         │
//! │            ▼                                                            │
//! │          is_submitting = true, last_error = None                        │
//! │            │                                                            │
//! │          validate_booking() ──fail──► last_error = VALIDATION_FAILED    │
//! │            │ ok                       is_submitting = false             │
//! │            ▼                          Err(Validation)                   │
//! │          booking_data() ─► unlock                                       │
//! │            │                                                            │
//! │          backend.create_booking(payload).await                          │
//! │            │                                                            │
//! │      ┌─────┴──────┐                                                     │
//! │      ▼ Ok(id)     ▼ Err(e)                                              │
//! │  last_booking_id  last_error = SUBMISSION_FAILED                        │
//! │  is_submitting = false (both paths), draft otherwise untouched          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `reset` during the backend call starts a new generation but keeps
//! `is_submitting` set until the call returns. The outcome is then returned
//! to the caller without being recorded on the new generation.
//!
//! ## Rehydration
//! A new store starts with `rehydrated = false`. [`BookingStore::rehydrate`]
//! merges the persisted snapshot (if any) and flips the flag to `true`
//! exactly once. Views wait on [`BookingStore::wait_rehydrated`] or a
//! [`BookingStore::subscribe_rehydrated`] receiver before trusting the draft.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Local;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use hoffman_core::{
    ArrivalWindow, ArrivalWindowPatch, BookingBackend, BookingError, BookingValidation,
    ContactInfo, ErrorCode, Money, Service, ServicePatch, DEFAULT_STORAGE_KEY,
};

use crate::draft::{BookingDraft, DebugInfo, ImportedDraft};
use crate::error::{StoreError, StoreResult};
use crate::persist::{decode_draft, encode_draft, DraftStorage};

/// The booking draft store.
///
/// Construct one per session and share it by reference (or `Arc`).
pub struct BookingStore {
    draft: Mutex<BookingDraft>,
    storage: Arc<dyn DraftStorage>,
    backend: Arc<dyn BookingBackend>,
    storage_key: String,
    rehydrated: watch::Sender<bool>,
    version: watch::Sender<u64>,
}

impl BookingStore {
    /// Creates an empty, not-yet-rehydrated store under the default key.
    pub fn new(storage: Arc<dyn DraftStorage>, backend: Arc<dyn BookingBackend>) -> Self {
        Self::with_key(storage, backend, DEFAULT_STORAGE_KEY)
    }

    /// Creates an empty, not-yet-rehydrated store under `storage_key`.
    pub fn with_key(
        storage: Arc<dyn DraftStorage>,
        backend: Arc<dyn BookingBackend>,
        storage_key: impl Into<String>,
    ) -> Self {
        let draft = BookingDraft::new();
        let (version, _) = watch::channel(draft.version);
        let (rehydrated, _) = watch::channel(false);
        BookingStore {
            draft: Mutex::new(draft),
            storage,
            backend,
            storage_key: storage_key.into(),
            rehydrated,
            version,
        }
    }

    /// Creates a store and rehydrates it immediately.
    pub fn open(storage: Arc<dyn DraftStorage>, backend: Arc<dyn BookingBackend>) -> Self {
        let store = Self::new(storage, backend);
        store.rehydrate();
        store
    }

    fn lock(&self) -> MutexGuard<'_, BookingDraft> {
        self.draft.lock().expect("Draft mutex poisoned")
    }

    /// Writes the draft to storage. Failures are logged, never returned.
    fn persist(&self, draft: &BookingDraft) {
        let result = encode_draft(draft).and_then(|raw| self.storage.save(&self.storage_key, &raw));
        if let Err(e) = result {
            warn!(key = %self.storage_key, error = %e, "Failed to persist booking draft");
        }
    }

    /// Runs a mutation, then persists the result.
    fn mutate<R>(&self, op: &'static str, f: impl FnOnce(&mut BookingDraft) -> R) -> R {
        let mut draft = self.lock();
        let out = f(&mut draft);
        debug!(op, services = draft.selected_services.len(), photos = draft.photos.len(), "Draft updated");
        self.persist(&draft);
        out
    }

    // =========================================================================
    // Rehydration
    // =========================================================================

    /// Loads the persisted snapshot into memory and marks the store ready.
    ///
    /// Only the first call does anything. A missing, unreadable or
    /// unknown-format snapshot leaves the draft empty; the store still
    /// becomes ready.
    pub fn rehydrate(&self) {
        // Checked under the draft lock so concurrent callers load once.
        let mut draft = self.lock();
        if *self.rehydrated.borrow() {
            debug!("Draft already rehydrated");
            return;
        }

        match self.storage.load(&self.storage_key) {
            Ok(Some(raw)) => {
                if let Some(mut restored) = decode_draft(&raw) {
                    if restored.is_submitting {
                        warn!("Persisted draft claimed a submission in flight; clearing flag");
                        restored.is_submitting = false;
                    }
                    info!(
                        services = restored.selected_services.len(),
                        version = restored.version,
                        "Booking draft rehydrated"
                    );
                    *draft = restored;
                }
            }
            Ok(None) => debug!(key = %self.storage_key, "No persisted booking draft"),
            Err(e) => warn!(key = %self.storage_key, error = %e, "Failed to read persisted draft"),
        }
        self.version.send_replace(draft.version);
        self.rehydrated.send_replace(true);
    }

    pub fn is_rehydrated(&self) -> bool {
        *self.rehydrated.borrow()
    }

    /// Receiver that observes the `rehydrated` flag.
    pub fn subscribe_rehydrated(&self) -> watch::Receiver<bool> {
        self.rehydrated.subscribe()
    }

    /// Receiver that observes the draft `version` (bumped on reset).
    pub fn subscribe_version(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Resolves once the store has been rehydrated.
    pub async fn wait_rehydrated(&self) {
        let mut rx = self.rehydrated.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    // =========================================================================
    // Read access
    // =========================================================================

    /// Runs `f` with read access to the draft.
    pub fn with_draft<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&BookingDraft) -> R,
    {
        f(&self.lock())
    }

    /// Clone of the current draft.
    pub fn snapshot(&self) -> BookingDraft {
        self.lock().clone()
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    pub fn add_service(&self, service: Service) -> bool {
        self.mutate("add_service", |d| d.add_service(service))
    }

    pub fn remove_service(&self, id: &str) -> bool {
        self.mutate("remove_service", |d| d.remove_service(id))
    }

    pub fn update_service(&self, id: &str, patch: ServicePatch) -> bool {
        self.mutate("update_service", |d| d.update_service(id, patch))
    }

    pub fn clear_services(&self) {
        self.mutate("clear_services", BookingDraft::clear_services)
    }

    pub fn set_contact_info(&self, info: ContactInfo) {
        self.mutate("set_contact_info", |d| d.set_contact_info(info))
    }

    pub fn update_contact_info(&self, patch: ContactInfo) -> bool {
        self.mutate("update_contact_info", |d| d.update_contact_info(patch))
    }

    pub fn clear_contact_info(&self) {
        self.mutate("clear_contact_info", BookingDraft::clear_contact_info)
    }

    pub fn set_arrival_window(&self, window: ArrivalWindow) {
        self.mutate("set_arrival_window", |d| d.set_arrival_window(window))
    }

    pub fn update_arrival_window(&self, patch: ArrivalWindowPatch) -> bool {
        self.mutate("update_arrival_window", |d| d.update_arrival_window(patch))
    }

    pub fn clear_arrival_window(&self) {
        self.mutate("clear_arrival_window", BookingDraft::clear_arrival_window)
    }

    pub fn set_additional_details(&self, details: impl Into<String>) {
        let details = details.into();
        self.mutate("set_additional_details", |d| d.set_additional_details(details))
    }

    pub fn add_photo(&self, data_uri: impl Into<String>) -> bool {
        let data_uri = data_uri.into();
        let added = self.mutate("add_photo", |d| d.add_photo(data_uri));
        if !added {
            debug!("Photo rejected");
        }
        added
    }

    pub fn remove_photo(&self, index: usize) -> bool {
        self.mutate("remove_photo", |d| d.remove_photo(index))
    }

    pub fn reorder_photos(&self, from: usize, to: usize) -> bool {
        self.mutate("reorder_photos", |d| d.reorder_photos(from, to))
    }

    pub fn clear_photos(&self) {
        self.mutate("clear_photos", BookingDraft::clear_photos)
    }

    pub fn clear_error(&self) {
        self.mutate("clear_error", BookingDraft::clear_error)
    }

    pub fn set_loading(&self, loading: bool) {
        self.mutate("set_loading", |d| d.set_loading(loading))
    }

    /// Starts a new draft generation.
    pub fn reset(&self, keep_contact_info: bool) {
        let version = self.mutate("reset", |d| {
            d.reset(keep_contact_info);
            d.version
        });
        info!(version, keep_contact_info, "Booking draft reset");
        self.version.send_replace(version);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn total_price(&self) -> Money {
        self.with_draft(BookingDraft::total_price)
    }

    pub fn service_count(&self) -> usize {
        self.with_draft(BookingDraft::service_count)
    }

    pub fn is_service_selected(&self, id: &str) -> bool {
        self.with_draft(|d| d.is_service_selected(id))
    }

    pub fn service_by_id(&self, id: &str) -> Option<Service> {
        self.with_draft(|d| d.service_by_id(id).cloned())
    }

    pub fn booking_summary(&self) -> String {
        self.with_draft(BookingDraft::booking_summary)
    }

    pub fn can_submit(&self) -> bool {
        self.with_draft(BookingDraft::can_submit)
    }

    pub fn debug_info(&self) -> DebugInfo {
        self.with_draft(BookingDraft::debug_info)
    }

    pub fn validate_booking(&self) -> BookingValidation {
        self.with_draft(BookingDraft::validate_booking)
    }

    pub fn validate_contact_info(&self) -> BookingValidation {
        self.with_draft(BookingDraft::validate_contact_info)
    }

    pub fn validate_services(&self) -> BookingValidation {
        self.with_draft(BookingDraft::validate_services)
    }

    /// Validates the arrival window against today's local date.
    pub fn validate_arrival_window(&self) -> BookingValidation {
        let today = Local::now().date_naive();
        self.with_draft(|d| d.validate_arrival_window(today))
    }

    pub fn booking_data(&self) -> Option<hoffman_core::BookingPayload> {
        self.with_draft(BookingDraft::booking_data)
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Validates the draft and hands it to the persistence boundary.
    ///
    /// On success returns the new booking id and records it as
    /// `last_booking_id`; the draft is not cleared. Every failure is also
    /// recorded in `last_error`, except [`StoreError::SubmissionInProgress`]
    /// which leaves the in-flight attempt's state alone.
    pub async fn submit_booking(&self) -> StoreResult<String> {
        let (payload, generation) = {
            let mut draft = self.lock();
            if draft.is_submitting {
                warn!("Rejected submission while another is in flight");
                return Err(StoreError::SubmissionInProgress);
            }
            draft.is_submitting = true;
            draft.last_error = None;
            let generation = draft.version;

            let validation = draft.validate_booking();
            let payload = if validation.is_valid {
                draft.booking_data()
            } else {
                None
            };

            match payload {
                Some(payload) => {
                    self.persist(&draft);
                    (payload, generation)
                }
                None => {
                    let message = if validation.is_valid {
                        "Invalid booking data".to_string()
                    } else {
                        validation.message()
                    };
                    draft.last_error =
                        Some(BookingError::new(ErrorCode::ValidationFailed, message.clone()));
                    draft.is_submitting = false;
                    self.persist(&draft);
                    warn!(%message, "Booking validation failed");
                    return Err(StoreError::Validation {
                        message,
                        errors: validation.errors,
                    });
                }
            }
        };

        info!(
            services = payload.services.len(),
            total = %payload.total,
            photos = payload.photos.len(),
            "Submitting booking"
        );

        let result = self.backend.create_booking(payload).await;

        let mut draft = self.lock();
        draft.is_submitting = false;
        // Outcomes are only recorded on the generation that submitted.
        let current = draft.version == generation;
        if !current {
            debug!(generation, version = draft.version, "Draft reset during submission");
        }
        let outcome = match result {
            Ok(booking_id) => {
                info!(%booking_id, "Booking submitted");
                if current {
                    draft.last_booking_id = Some(booking_id.clone());
                }
                Ok(booking_id)
            }
            Err(source) => {
                let booking_error = BookingError::submission_failed(&source);
                error!(error = %source, "Booking submission failed");
                if current {
                    draft.last_error = Some(booking_error.clone());
                }
                Err(StoreError::Submission {
                    error: booking_error,
                    source,
                })
            }
        };
        self.persist(&draft);
        outcome
    }

    /// Runs [`BookingStore::submit_booking`] again. One attempt per call.
    pub async fn retry_submission(&self) -> StoreResult<String> {
        self.submit_booking().await
    }

    // =========================================================================
    // Export / import
    // =========================================================================

    /// Serializes the whole draft as pretty JSON.
    pub fn export_booking_data(&self) -> StoreResult<String> {
        Ok(self.with_draft(serde_json::to_string_pretty)?)
    }

    /// Replaces services, contact info, arrival window and details from an
    /// export.
    ///
    /// Malformed input is logged and ignored; the draft is left as it was.
    /// Returns whether the import was applied.
    pub fn import_booking_data(&self, json: &str) -> bool {
        let imported: ImportedDraft = match serde_json::from_str(json) {
            Ok(imported) => imported,
            Err(e) => {
                error!(error = %e, "Invalid booking data");
                return false;
            }
        };
        self.mutate("import_booking_data", |d| d.apply_import(imported));
        true
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStorage;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use hoffman_core::catalog;
    use hoffman_core::contact::ContactField;
    use hoffman_core::{BackendError, BookingPayload, TimeSlot};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    // -------------------------------------------------------------------------
    // Mock backends
    // -------------------------------------------------------------------------

    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<BookingPayload>>,
    }

    #[async_trait]
    impl BookingBackend for RecordingBackend {
        async fn create_booking(&self, payload: BookingPayload) -> Result<String, BackendError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(payload);
            Ok(format!("booking-{}", calls.len()))
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl BookingBackend for FailingBackend {
        async fn create_booking(&self, _payload: BookingPayload) -> Result<String, BackendError> {
            Err(BackendError::Network("connection reset".into()))
        }
    }

    #[derive(Default)]
    struct SlowBackend {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl BookingBackend for SlowBackend {
        async fn create_booking(&self, _payload: BookingPayload) -> Result<String, BackendError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok("slow-1".into())
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn store_with(backend: Arc<dyn BookingBackend>) -> BookingStore {
        BookingStore::open(Arc::new(MemoryStorage::new()), backend)
    }

    fn contact() -> ContactInfo {
        ContactInfo::default()
            .with(ContactField::FirstName, "A")
            .with(ContactField::LastName, "B")
            .with(ContactField::Email, "a@b.com")
            .with(ContactField::Phone, "5551234567")
    }

    fn june_first() -> ArrivalWindow {
        ArrivalWindow::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), TimeSlot::Afternoon)
    }

    fn fill(store: &BookingStore) {
        store.add_service(catalog::find_service("room-2").unwrap());
        store.set_contact_info(contact());
        store.set_arrival_window(june_first());
    }

    // -------------------------------------------------------------------------
    // Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_submit_gating() {
        let store = store_with(Arc::new(RecordingBackend::default()));
        assert!(!store.can_submit());

        store.add_service(catalog::find_service("rug").unwrap());
        store.set_arrival_window(june_first());
        assert!(!store.can_submit());

        store.set_contact_info(contact());
        assert!(store.can_submit());
    }

    #[tokio::test]
    async fn test_submit_success_records_booking_id() {
        let backend = Arc::new(RecordingBackend::default());
        let store = store_with(backend.clone());
        fill(&store);

        let id = store.submit_booking().await.unwrap();
        assert_eq!(id, "booking-1");

        let draft = store.snapshot();
        assert_eq!(draft.last_booking_id.as_deref(), Some("booking-1"));
        assert!(!draft.is_submitting);
        assert!(draft.last_error.is_none());
        // Not cleared until the caller resets.
        assert_eq!(draft.selected_services.len(), 1);

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls[0].total, Money::from_dollars(150));
        assert_eq!(calls[0].arrival_window.time, "12:30pm - 3:30pm");
    }

    #[tokio::test]
    async fn test_validation_failure_preserves_draft_and_skips_backend() {
        let backend = Arc::new(RecordingBackend::default());
        let store = store_with(backend.clone());
        store.add_service(catalog::find_service("sofa").unwrap());

        let err = store.submit_booking().await.unwrap_err();
        match &err {
            StoreError::Validation { message, errors } => {
                assert_eq!(message, "Contact required, Arrival window required");
                assert_eq!(errors.len(), 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let draft = store.snapshot();
        assert_eq!(draft.last_error.as_ref().unwrap().code, ErrorCode::ValidationFailed);
        assert!(!draft.is_submitting);
        assert_eq!(draft.selected_services.len(), 1);
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submission_failure_preserves_draft() {
        let store = store_with(Arc::new(FailingBackend));
        fill(&store);
        let before = store.snapshot();

        let err = store.submit_booking().await.unwrap_err();
        assert!(matches!(err, StoreError::Submission { .. }));

        let after = store.snapshot();
        let last_error = after.last_error.as_ref().unwrap();
        assert_eq!(last_error.code, ErrorCode::SubmissionFailed);
        assert!(last_error.message.contains("connection reset"));
        assert!(!after.is_submitting);
        assert_eq!(after.selected_services, before.selected_services);
        assert_eq!(after.contact_info, before.contact_info);
        assert_eq!(after.arrival_window, before.arrival_window);

        // A manual retry makes exactly one more attempt.
        assert!(store.retry_submission().await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_submission_is_rejected() {
        let backend = Arc::new(SlowBackend::default());
        let store = Arc::new(store_with(backend.clone()));
        fill(&store);

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.submit_booking().await }
        });
        backend.started.notified().await;

        assert!(store.snapshot().is_submitting);
        assert!(!store.can_submit());
        let second = store.submit_booking().await;
        assert!(matches!(second, Err(StoreError::SubmissionInProgress)));
        assert!(store.snapshot().last_error.is_none());

        backend.release.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), "slow-1");
        assert!(!store.snapshot().is_submitting);
    }

    #[tokio::test]
    async fn test_reset_during_submission_keeps_guard() {
        let backend = Arc::new(SlowBackend::default());
        let store = Arc::new(store_with(backend.clone()));
        fill(&store);

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.submit_booking().await }
        });
        backend.started.notified().await;

        store.reset(true);
        assert!(store.snapshot().is_submitting);

        fill(&store);
        let second = store.submit_booking().await;
        assert!(matches!(second, Err(StoreError::SubmissionInProgress)));

        backend.release.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), "slow-1");

        let draft = store.snapshot();
        assert!(!draft.is_submitting);
        assert!(draft.last_booking_id.is_none());
        assert!(draft.last_error.is_none());
        assert_eq!(draft.service_count(), 1);
    }

    #[tokio::test]
    async fn test_reset_bumps_version_signal() {
        let store = store_with(Arc::new(RecordingBackend::default()));
        fill(&store);
        let mut versions = store.subscribe_version();
        let start = *versions.borrow_and_update();

        store.reset(true);
        assert!(versions.has_changed().unwrap());
        assert_eq!(*versions.borrow_and_update(), start + 1);

        let draft = store.snapshot();
        assert_eq!(draft.contact_info, Some(contact()));
        assert!(draft.selected_services.is_empty());
        assert!(draft.arrival_window.is_none());

        store.reset(false);
        assert_eq!(*versions.borrow(), start + 2);
        assert!(store.snapshot().contact_info.is_none());
        assert!(store.snapshot().created_at.is_none());
    }

    #[tokio::test]
    async fn test_rehydration_round_trip() {
        let storage: Arc<dyn DraftStorage> = Arc::new(MemoryStorage::new());
        let backend: Arc<dyn BookingBackend> = Arc::new(RecordingBackend::default());

        let first = BookingStore::open(storage.clone(), backend.clone());
        fill(&first);
        first.add_photo("data:image/png;base64,iVBORw0KGgo=");

        let second = BookingStore::new(storage, backend);
        assert!(!second.is_rehydrated());
        assert!(second.snapshot().arrival_window.is_none());

        let mut ready = second.subscribe_rehydrated();
        assert!(!*ready.borrow_and_update());

        second.rehydrate();
        assert!(ready.has_changed().unwrap());
        assert!(*ready.borrow_and_update());

        second.rehydrate();
        assert!(!ready.has_changed().unwrap());

        second.wait_rehydrated().await;
        let draft = second.snapshot();
        assert_eq!(
            draft.arrival_window.unwrap().date,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert_eq!(draft.contact_info, Some(contact()));
        assert_eq!(draft.photos.len(), 1);
    }

    #[derive(Default)]
    struct CountingStorage {
        inner: MemoryStorage,
        loads: AtomicUsize,
    }

    impl DraftStorage for CountingStorage {
        fn load(&self, key: &str) -> StoreResult<Option<String>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load(key)
        }

        fn save(&self, key: &str, value: &str) -> StoreResult<()> {
            self.inner.save(key, value)
        }

        fn remove(&self, key: &str) -> StoreResult<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_concurrent_rehydrate_loads_once() {
        let storage = Arc::new(CountingStorage::default());
        let mut saved = BookingDraft::new();
        saved.add_service(catalog::find_service("rug").unwrap());
        storage
            .save(DEFAULT_STORAGE_KEY, &encode_draft(&saved).unwrap())
            .unwrap();

        let store = BookingStore::new(storage.clone(), Arc::new(RecordingBackend::default()));
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| store.rehydrate());
            }
        });
        assert_eq!(storage.loads.load(Ordering::SeqCst), 1);

        store.add_service(catalog::find_service("sofa").unwrap());
        store.rehydrate();
        assert_eq!(storage.loads.load(Ordering::SeqCst), 1);
        assert_eq!(store.service_count(), 2);
    }

    #[tokio::test]
    async fn test_rehydrate_clears_stale_submitting_flag() {
        let storage = Arc::new(MemoryStorage::new());
        let mut draft = BookingDraft::new();
        draft.is_submitting = true;
        storage
            .save(DEFAULT_STORAGE_KEY, &encode_draft(&draft).unwrap())
            .unwrap();

        let store = BookingStore::open(storage, Arc::new(RecordingBackend::default()));
        assert!(!store.snapshot().is_submitting);
    }

    #[tokio::test]
    async fn test_unreadable_snapshot_still_marks_ready() {
        let storage = Arc::new(MemoryStorage::new());
        storage.save(DEFAULT_STORAGE_KEY, "{broken").unwrap();

        let store = BookingStore::open(storage, Arc::new(RecordingBackend::default()));
        assert!(store.is_rehydrated());
        assert_eq!(store.service_count(), 0);
    }

    #[test]
    fn test_contact_update_round_trip() {
        let store = store_with(Arc::new(RecordingBackend::default()));
        store.set_contact_info(contact());
        store.update_contact_info(ContactInfo::default().with(ContactField::Email, "c@d.com"));

        let encoded = store.with_draft(|d| d.contact_info.as_ref().unwrap().encode());
        let decoded = ContactInfo::decode(&encoded);
        assert_eq!(decoded.first_name.as_deref(), Some("A"));
        assert_eq!(decoded.email.as_deref(), Some("c@d.com"));
    }

    #[test]
    fn test_export_import() {
        let source = store_with(Arc::new(RecordingBackend::default()));
        fill(&source);
        source.set_additional_details("Dog in yard");
        let exported = source.export_booking_data().unwrap();

        let target = store_with(Arc::new(RecordingBackend::default()));
        target.add_photo("data:image/png;base64,iVBORw0KGgo=");
        assert!(target.import_booking_data(&exported));

        let draft = target.snapshot();
        assert_eq!(draft.selected_services.len(), 1);
        assert_eq!(draft.additional_details, "Dog in yard");
        assert_eq!(draft.arrival_window, Some(june_first()));
        assert_eq!(draft.photos.len(), 1);
    }

    #[test]
    fn test_malformed_import_leaves_state() {
        let store = store_with(Arc::new(RecordingBackend::default()));
        fill(&store);
        let before = store.snapshot();

        assert!(!store.import_booking_data("{oops"));
        assert!(!store.import_booking_data(r#"{"arrivalWindow":{"date":"never","time":"Morning"}}"#));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_import_rejects_out_of_range_prices() {
        let store = store_with(Arc::new(RecordingBackend::default()));
        fill(&store);
        let before = store.snapshot();

        let huge = r#"{"selectedServices":[
            {"id":"a","name":"A","price":1e20,"description":"","category":"x"},
            {"id":"b","name":"B","price":1e20,"description":"","category":"x"}
        ]}"#;
        assert!(!store.import_booking_data(huge));
        assert_eq!(store.snapshot(), before);
        assert_eq!(store.total_price(), Money::from_dollars(150));
        assert!(store.can_submit());
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        let store = BookingStore::open(storage.clone(), Arc::new(RecordingBackend::default()));

        store.add_service(catalog::find_service("tile").unwrap());
        let saved = decode_draft(&storage.load(DEFAULT_STORAGE_KEY).unwrap().unwrap()).unwrap();
        assert!(saved.is_service_selected("tile"));

        store.remove_service("tile");
        let saved = decode_draft(&storage.load(DEFAULT_STORAGE_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved.service_count(), 0);
    }

    #[test]
    fn test_debug_info() {
        let store = store_with(Arc::new(RecordingBackend::default()));
        fill(&store);
        let info = store.debug_info();
        assert_eq!(info.service_count, 1);
        assert_eq!(info.total_price, Money::from_dollars(150));
        assert!(info.has_contact_info && info.has_arrival_window);
        assert_eq!(info.version, 1);
    }
}
