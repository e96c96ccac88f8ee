//! # Booking Draft
//!
//! The in-progress booking as a plain owned value, with its mutators,
//! derived queries and validation. Nothing here does I/O; the
//! [`crate::BookingStore`] wraps a draft with locking, persistence and
//! submission.
//!
//! ## Draft Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   empty ──add_service──► has services (createdAt set once)             │
//! │     ▲                        │                                          │
//! │     │                  set_contact_info / set_arrival_window / ...      │
//! │     │                        ▼                                          │
//! │     │                   submittable ──submit──► lastBookingId set       │
//! │     │                                               │                   │
//! │     └──────────────── reset(keep_contact) ◄─────────┘                   │
//! │                       (version += 1)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one service per id
//! - At most [`MAX_PHOTOS`] photos, each an image data-URI
//! - `created_at` is set once, by the first service added to an empty draft
//! - `version` only grows, by exactly one per reset

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use hoffman_core::contact::ContactInfo;
use hoffman_core::photo::is_image_data_uri;
use hoffman_core::types::timestamp;
use hoffman_core::validation::{validate_contact_form, validate_service_price};
use hoffman_core::wire::{BookingPayload, WireArrivalWindow, WireService};
use hoffman_core::{
    ArrivalWindow, ArrivalWindowPatch, BookingError, BookingValidation, ErrorCode, Money, Service,
    ServicePatch, BOOKING_HORIZON_DAYS, MAX_PHOTOS,
};

// =============================================================================
// Draft State
// =============================================================================

/// The in-progress booking.
///
/// This is exactly what gets persisted. The runtime-only `rehydrated`
/// flag lives on the store, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingDraft {
    pub selected_services: Vec<Service>,

    #[serde(deserialize_with = "contact_compat")]
    pub contact_info: Option<ContactInfo>,

    pub arrival_window: Option<ArrivalWindow>,

    pub additional_details: String,

    /// Image data-URIs in display order.
    pub photos: Vec<String>,

    pub is_submitting: bool,
    pub is_loading: bool,
    pub last_error: Option<BookingError>,
    pub last_booking_id: Option<String>,

    #[serde(with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(with = "timestamp")]
    pub last_updated: DateTime<Utc>,

    /// Draft generation, bumped on every reset.
    pub version: u64,
}

impl Default for BookingDraft {
    fn default() -> Self {
        BookingDraft {
            selected_services: Vec::new(),
            contact_info: None,
            arrival_window: None,
            additional_details: String::new(),
            photos: Vec::new(),
            is_submitting: false,
            is_loading: false,
            last_error: None,
            last_booking_id: None,
            created_at: None,
            last_updated: Utc::now(),
            version: 1,
        }
    }
}

/// Diagnostic snapshot of a draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub service_count: usize,
    #[serde(with = "hoffman_core::money::as_dollars")]
    pub total_price: Money,
    pub has_contact_info: bool,
    pub has_arrival_window: bool,
    pub photo_count: usize,
    pub version: u64,
}

impl BookingDraft {
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    // =========================================================================
    // Services
    // =========================================================================

    /// Appends a service unless its id is already selected.
    ///
    /// Returns false when nothing changed (duplicate id or negative price).
    pub fn add_service(&mut self, service: Service) -> bool {
        if self.is_service_selected(&service.id) || validate_service_price(service.price).is_err() {
            return false;
        }
        if self.created_at.is_none() {
            self.created_at = Some(Utc::now());
        }
        self.selected_services.push(service);
        self.touch();
        true
    }

    pub fn remove_service(&mut self, id: &str) -> bool {
        let before = self.selected_services.len();
        self.selected_services.retain(|s| s.id != id);
        self.touch();
        self.selected_services.len() != before
    }

    /// Applies a partial update to a selected service. A negative price
    /// in the patch is ignored.
    pub fn update_service(&mut self, id: &str, mut patch: ServicePatch) -> bool {
        if matches!(patch.price, Some(p) if p.is_negative()) {
            patch.price = None;
        }
        let found = match self.selected_services.iter_mut().find(|s| s.id == id) {
            Some(service) => {
                service.apply(patch);
                true
            }
            None => false,
        };
        self.touch();
        found
    }

    pub fn clear_services(&mut self) {
        self.selected_services.clear();
        self.touch();
    }

    // =========================================================================
    // Contact
    // =========================================================================

    pub fn set_contact_info(&mut self, info: ContactInfo) {
        self.contact_info = Some(info);
        self.touch();
    }

    /// Merges the set fields of `patch` into the existing contact info.
    /// Does nothing when no contact info has been set yet.
    pub fn update_contact_info(&mut self, patch: ContactInfo) -> bool {
        let Some(info) = self.contact_info.as_mut() else {
            return false;
        };
        info.merge(patch);
        self.touch();
        true
    }

    pub fn clear_contact_info(&mut self) {
        self.contact_info = None;
        self.touch();
    }

    // =========================================================================
    // Arrival window
    // =========================================================================

    pub fn set_arrival_window(&mut self, window: ArrivalWindow) {
        self.arrival_window = Some(window);
        self.touch();
    }

    /// Updates the existing window. Does nothing when none is set.
    pub fn update_arrival_window(&mut self, patch: ArrivalWindowPatch) -> bool {
        let updated = match self.arrival_window.as_mut() {
            Some(window) => {
                window.apply(patch);
                true
            }
            None => false,
        };
        self.touch();
        updated
    }

    pub fn clear_arrival_window(&mut self) {
        self.arrival_window = None;
        self.touch();
    }

    pub fn set_additional_details(&mut self, details: impl Into<String>) {
        self.additional_details = details.into();
        self.touch();
    }

    // =========================================================================
    // Photos
    // =========================================================================

    /// Appends a photo. Non-image values and photos past the cap are dropped.
    pub fn add_photo(&mut self, data_uri: impl Into<String>) -> bool {
        let data_uri = data_uri.into();
        if !is_image_data_uri(&data_uri) || self.photos.len() >= MAX_PHOTOS {
            return false;
        }
        self.photos.push(data_uri);
        self.touch();
        true
    }

    pub fn remove_photo(&mut self, index: usize) -> bool {
        let removed = index < self.photos.len();
        if removed {
            self.photos.remove(index);
        }
        self.touch();
        removed
    }

    /// Moves the photo at `from` so it ends up at `to`.
    ///
    /// A `to` past the end moves the photo to the end. An out-of-range
    /// `from` leaves the order unchanged.
    pub fn reorder_photos(&mut self, from: usize, to: usize) -> bool {
        if from >= self.photos.len() {
            return false;
        }
        let photo = self.photos.remove(from);
        let to = to.min(self.photos.len());
        self.photos.insert(to, photo);
        self.touch();
        true
    }

    pub fn clear_photos(&mut self) {
        self.photos.clear();
        self.touch();
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Clears the draft for a new booking and bumps `version`.
    ///
    /// Contact info and `created_at` survive when `keep_contact_info` is set.
    /// `is_submitting` belongs to the submission in flight and is left as is.
    pub fn reset(&mut self, keep_contact_info: bool) {
        self.selected_services.clear();
        self.arrival_window = None;
        self.additional_details.clear();
        self.photos.clear();
        self.is_loading = false;
        self.last_error = None;
        self.last_booking_id = None;
        self.version += 1;
        if !keep_contact_info {
            self.contact_info = None;
            self.created_at = None;
        }
        self.touch();
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    /// Replaces the step data with imported values. Status fields,
    /// photos and bookkeeping stay as they are.
    pub(crate) fn apply_import(&mut self, imported: ImportedDraft) {
        let mut services: Vec<Service> = Vec::with_capacity(imported.selected_services.len());
        for service in imported.selected_services {
            if !services.iter().any(|s| s.id == service.id) && !service.price.is_negative() {
                services.push(service);
            }
        }
        self.selected_services = services;
        self.contact_info = imported.contact_info;
        self.arrival_window = imported.arrival_window;
        self.additional_details = imported.additional_details;
        self.touch();
    }

    // =========================================================================
    // Derived queries
    // =========================================================================

    /// Exact sum of the selected service prices.
    pub fn total_price(&self) -> Money {
        self.selected_services.iter().map(|s| s.price).sum()
    }

    pub fn service_count(&self) -> usize {
        self.selected_services.len()
    }

    pub fn is_service_selected(&self, id: &str) -> bool {
        self.selected_services.iter().any(|s| s.id == id)
    }

    pub fn service_by_id(&self, id: &str) -> Option<&Service> {
        self.selected_services.iter().find(|s| s.id == id)
    }

    /// One-line digest, e.g. `Services: Sofa, Rug | Total: $90.00`.
    pub fn booking_summary(&self) -> String {
        let names = self
            .selected_services
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!("Services: {} | Total: {}", names, self.total_price())
    }

    /// True when the draft validates and no submission is in flight.
    pub fn can_submit(&self) -> bool {
        !self.is_submitting && self.validate_booking().is_valid
    }

    pub fn debug_info(&self) -> DebugInfo {
        DebugInfo {
            service_count: self.service_count(),
            total_price: self.total_price(),
            has_contact_info: self.contact_info.is_some(),
            has_arrival_window: self.arrival_window.is_some(),
            photo_count: self.photos.len(),
            version: self.version,
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Aggregate check run before submission: contact info, at least one
    /// service and an arrival window must all be present.
    pub fn validate_booking(&self) -> BookingValidation {
        let mut errors = Vec::new();
        if self.contact_info.is_none() {
            errors.push(BookingError::for_field(
                ErrorCode::MissingContact,
                "Contact required",
                "contactInfo",
            ));
        }
        if self.selected_services.is_empty() {
            errors.push(BookingError::for_field(
                ErrorCode::NoServices,
                "Add at least one service",
                "services",
            ));
        }
        if self.arrival_window.is_none() {
            errors.push(BookingError::for_field(
                ErrorCode::MissingArrivalWindow,
                "Arrival window required",
                "arrivalWindow",
            ));
        }
        BookingValidation::from_parts(errors, Vec::new())
    }

    /// Checks contact presence, then every field against the contact form rules.
    pub fn validate_contact_info(&self) -> BookingValidation {
        let errors = match &self.contact_info {
            None => vec![BookingError::for_field(
                ErrorCode::MissingContact,
                "Contact required",
                "contactInfo",
            )],
            Some(info) => validate_contact_form(info)
                .iter()
                .map(BookingError::from)
                .collect(),
        };
        BookingValidation::from_parts(errors, Vec::new())
    }

    pub fn validate_services(&self) -> BookingValidation {
        let mut errors = Vec::new();
        if self.selected_services.is_empty() {
            errors.push(BookingError::for_field(
                ErrorCode::NoServices,
                "Add at least one service",
                "services",
            ));
        }
        BookingValidation::from_parts(errors, Vec::new())
    }

    /// Checks the window is set. Dates in the past or beyond the booking
    /// horizon only produce warnings.
    pub fn validate_arrival_window(&self, today: NaiveDate) -> BookingValidation {
        let Some(window) = &self.arrival_window else {
            return BookingValidation::from_parts(
                vec![BookingError::for_field(
                    ErrorCode::MissingArrivalWindow,
                    "Arrival window required",
                    "arrivalWindow",
                )],
                Vec::new(),
            );
        };

        let mut warnings = Vec::new();
        if window.date < today {
            warnings.push("Arrival date is in the past".to_string());
        } else if window.date > today + Duration::days(BOOKING_HORIZON_DAYS) {
            warnings.push(format!(
                "Arrival date is more than {} days out",
                BOOKING_HORIZON_DAYS
            ));
        }
        BookingValidation::from_parts(Vec::new(), warnings)
    }

    // =========================================================================
    // Wire payload
    // =========================================================================

    /// Builds the `createBooking` payload.
    ///
    /// Returns `None` without contact info or an arrival window.
    pub fn booking_data(&self) -> Option<BookingPayload> {
        let contact = self.contact_info.as_ref()?;
        let window = self.arrival_window.as_ref()?;

        let details = self.additional_details.trim();
        Some(BookingPayload {
            services: self.selected_services.iter().map(WireService::from).collect(),
            contact_info: contact.wire_entries(),
            arrival_window: WireArrivalWindow {
                date: window.date.format("%Y-%m-%d").to_string(),
                time: window.time.label().to_string(),
            },
            additional_details: (!details.is_empty()).then(|| self.additional_details.clone()),
            photos: self.photos.clone(),
            total: self.total_price(),
        })
    }
}

// =============================================================================
// Import / legacy shapes
// =============================================================================

/// The fields `import_booking_data` reads. Everything else in the input is
/// ignored, so both exports of this store and browser exports load.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImportedDraft {
    #[serde(default)]
    pub selected_services: Vec<Service>,
    #[serde(default, deserialize_with = "contact_compat")]
    pub contact_info: Option<ContactInfo>,
    #[serde(default)]
    pub arrival_window: Option<ArrivalWindow>,
    #[serde(default)]
    pub additional_details: String,
}

/// Contact info may be stored as a record or as `"key:value"` entries.
fn contact_compat<'de, D>(deserializer: D) -> Result<Option<ContactInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Entries(Vec<String>),
        Record(ContactInfo),
    }

    Ok(match Option::<Stored>::deserialize(deserializer)? {
        Some(Stored::Entries(entries)) => Some(ContactInfo::decode(&entries)),
        Some(Stored::Record(info)) => Some(info),
        None => None,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
