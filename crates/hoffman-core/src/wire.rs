//! # Persistence Boundary
//!
//! The single call the draft store makes to the outside world, and the
//! payload it sends.
//!
//! ```text
//! ┌──────────────────┐   BookingPayload    ┌────────────────────────────┐
//! │  BookingStore    │ ──────────────────► │  impl BookingBackend       │
//! │  submit_booking  │                     │  (SQLite, hosted API, mock)│
//! │                  │ ◄────────────────── │  uploads photos, persists, │
//! └──────────────────┘   Ok(booking id)    │  notifies best effort      │
//!                        Err(BackendError) └────────────────────────────┘
//! ```
//!
//! ## Wire Shape
//! ```json
//! {
//!   "services": [{ "id": "sofa", "name": "Sofa", "price": 40, "quantity": 1 }],
//!   "contactInfo": ["name:Ada Byron", "email:ada@example.com", "phone:5551234567", "..."],
//!   "arrivalWindow": { "date": "2024-06-01", "time": "9:00am - 12:00pm" },
//!   "additionalDetails": "Gate code 1234",
//!   "photos": ["data:image/png;base64,..."],
//!   "total": 40
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::BackendError;
use crate::money::Money;
use crate::types::Service;

/// A service line as the boundary receives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WireService {
    pub id: String,
    pub name: String,
    #[serde(with = "crate::money::as_dollars")]
    #[ts(type = "number")]
    pub price: Money,
    pub quantity: u32,
}

impl From<&Service> for WireService {
    fn from(service: &Service) -> Self {
        WireService {
            id: service.id.clone(),
            name: service.name.clone(),
            price: service.price,
            quantity: 1,
        }
    }
}

/// Arrival window with the date already formatted as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WireArrivalWindow {
    pub date: String,
    pub time: String,
}

/// The `createBooking` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub services: Vec<WireService>,

    /// `"key:value"` entries, see [`crate::contact::ContactInfo::wire_entries`].
    pub contact_info: Vec<String>,

    pub arrival_window: WireArrivalWindow,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_details: Option<String>,

    /// Data-URIs; the boundary uploads them and keeps the handles.
    #[serde(default)]
    pub photos: Vec<String>,

    /// Sum of service prices. No tax line.
    #[serde(with = "crate::money::as_dollars")]
    #[ts(type = "number")]
    pub total: Money,
}

/// The external persistence capability.
///
/// Implementations persist the record, upload photos and trigger a
/// best-effort notification. A notification failure must not fail the call.
#[async_trait]
pub trait BookingBackend: Send + Sync {
    /// Persists a booking and returns its id.
    async fn create_booking(&self, payload: BookingPayload) -> Result<String, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_wire_shape() {
        let payload = BookingPayload {
            services: vec![WireService {
                id: "rug".into(),
                name: "Rug".into(),
                price: Money::from_cents(25_50),
                quantity: 1,
            }],
            contact_info: vec!["name:Ada".into()],
            arrival_window: WireArrivalWindow {
                date: "2024-06-01".into(),
                time: "9:00am - 12:00pm".into(),
            },
            additional_details: None,
            photos: vec![],
            total: Money::from_cents(25_50),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["services"][0]["price"], 25.5);
        assert_eq!(json["services"][0]["quantity"], 1);
        assert_eq!(json["contactInfo"][0], "name:Ada");
        assert_eq!(json["arrivalWindow"]["date"], "2024-06-01");
        assert_eq!(json["total"], 25.5);
        assert!(json.get("additionalDetails").is_none());
    }
}
