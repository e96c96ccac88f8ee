//! # Domain Types
//!
//! Core domain types used throughout the booking workspace.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Service      │   │  ArrivalWindow  │   │  BookingStatus  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (catalog)   │   │  date (no time) │   │  Pending        │       │
//! │  │  name           │   │  time (slot)    │   │  Confirmed      │       │
//! │  │  price (Money)  │   │  timeZone?      │   │  Cancelled      │       │
//! │  │  category       │   │  flexibility?   │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────────────────────────┐     │
//! │  │    TimeSlot     │   │            BookingValidation            │     │
//! │  │  ─────────────  │   │  ─────────────────────────────────────  │     │
//! │  │  Morning        │   │  isValid, errors[BookingError],         │     │
//! │  │  Afternoon      │   │  warnings[String]                       │     │
//! │  │  Evening        │   └─────────────────────────────────────────┘     │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Contact info lives in [`crate::contact`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{BookingError, CoreError};
use crate::money::Money;

// =============================================================================
// Service
// =============================================================================

/// A catalog line item selected by the customer.
///
/// `price` is held in cents but serialized as decimal dollars, matching the
/// catalog and the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Stable catalog key. A draft holds at most one service per id.
    pub id: String,

    /// Display name (e.g. "2 Rooms").
    pub name: String,

    /// Price, never negative.
    #[serde(with = "crate::money::as_dollars")]
    #[ts(type = "number")]
    pub price: Money,

    pub description: String,

    /// Catalog category id (e.g. "carpet-cleaning").
    pub category: String,

    /// Expected duration label (e.g. "Up to 2 hours").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    /// Extra note shown with the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Partial update for a [`Service`]. The id cannot be changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServicePatch {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub duration: Option<String>,
    pub disclaimer: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

impl Service {
    /// Applies a partial update in place.
    pub fn apply(&mut self, patch: ServicePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if patch.duration.is_some() {
            self.duration = patch.duration;
        }
        if patch.disclaimer.is_some() {
            self.disclaimer = patch.disclaimer;
        }
        if patch.image_url.is_some() {
            self.image_url = patch.image_url;
        }
        if patch.is_active.is_some() {
            self.is_active = patch.is_active;
        }
    }
}

// =============================================================================
// Time Slot
// =============================================================================

/// The labeled arrival slots offered by the schedule step.
///
/// Serialized as the slot label (`"9:00am - 12:00pm"`). Parsing accepts the
/// label or the period name, case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
}

impl TimeSlot {
    /// All offered slots, in display order.
    pub const ALL: [TimeSlot; 3] = [TimeSlot::Morning, TimeSlot::Afternoon, TimeSlot::Evening];

    /// Slot label as stored and shown to the customer.
    pub fn label(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "9:00am - 12:00pm",
            TimeSlot::Afternoon => "12:30pm - 3:30pm",
            TimeSlot::Evening => "4:00pm - 7:00pm",
        }
    }

    pub fn period(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "Morning",
            TimeSlot::Afternoon => "Afternoon",
            TimeSlot::Evening => "Evening",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "Start your day fresh",
            TimeSlot::Afternoon => "Midday convenience",
            TimeSlot::Evening => "After work hours",
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeSlot {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        TimeSlot::ALL
            .into_iter()
            .find(|slot| {
                slot.label().eq_ignore_ascii_case(needle) || slot.period().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| CoreError::UnknownTimeSlot(s.to_string()))
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.label().to_string()
    }
}

// =============================================================================
// Arrival Window
// =============================================================================

/// The date and labeled slot the customer picked for service delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalWindow {
    /// Calendar date, no time of day.
    #[serde(with = "calendar_date")]
    #[ts(as = "String")]
    pub date: NaiveDate,

    #[ts(type = "string")]
    pub time: TimeSlot,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flexibility_minutes: Option<u32>,
}

impl ArrivalWindow {
    pub fn new(date: NaiveDate, time: TimeSlot) -> Self {
        ArrivalWindow {
            date,
            time,
            time_zone: None,
            flexibility_minutes: None,
        }
    }

    /// Applies a partial update in place.
    pub fn apply(&mut self, patch: ArrivalWindowPatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(time) = patch.time {
            self.time = time;
        }
        if patch.time_zone.is_some() {
            self.time_zone = patch.time_zone;
        }
        if patch.flexibility_minutes.is_some() {
            self.flexibility_minutes = patch.flexibility_minutes;
        }
    }
}

/// Partial update for an [`ArrivalWindow`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrivalWindowPatch {
    pub date: Option<NaiveDate>,
    pub time: Option<TimeSlot>,
    pub time_zone: Option<String>,
    pub flexibility_minutes: Option<u32>,
}

/// Serde adapter for calendar dates.
///
/// Writes `YYYY-MM-DD`. Reads either `YYYY-MM-DD` or a full RFC 3339
/// timestamp (what browser persistence stored), keeping the UTC calendar date.
pub mod calendar_date {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Parses a calendar date from either accepted form.
    pub fn parse(raw: &str) -> Result<NaiveDate, String> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, FORMAT) {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc).date_naive())
            .map_err(|_| format!("invalid calendar date: '{}'", raw))
    }
}

/// Serde adapter for instants.
///
/// Writes RFC 3339 with millisecond precision. Reads RFC 3339 or epoch
/// milliseconds (what browser persistence stored).
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Text(String),
    }

    fn from_raw(raw: Raw) -> Result<DateTime<Utc>, String> {
        match raw {
            Raw::Millis(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| format!("timestamp out of range: {}", ms)),
            Raw::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| format!("invalid timestamp: '{}'", text)),
        }
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        from_raw(Raw::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }

    /// Same adapter for optional instants.
    pub mod option {
        use super::*;

        pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(dt) => super::serialize(dt, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<Raw>::deserialize(deserializer)? {
                Some(raw) => from_raw(raw).map(Some).map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}

// =============================================================================
// Booking Status
// =============================================================================

/// Lifecycle status of a submitted booking document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Just submitted, awaiting admin review.
    #[default]
    Pending,
    /// Accepted by the admin.
    Confirmed,
    /// Rejected or cancelled.
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// =============================================================================
// Validation Report
// =============================================================================

/// Result of validating a draft or part of one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookingValidation {
    pub is_valid: bool,
    pub errors: Vec<BookingError>,
    pub warnings: Vec<String>,
}

impl BookingValidation {
    /// Builds a report; it is valid exactly when there are no errors.
    pub fn from_parts(errors: Vec<BookingError>, warnings: Vec<String>) -> Self {
        BookingValidation {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Error messages joined with `", "`.
    pub fn message(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sofa() -> Service {
        Service {
            id: "sofa".into(),
            name: "Sofa".into(),
            price: Money::from_dollars(40),
            description: "Sofa cleaning".into(),
            category: "additional-cleaning".into(),
            duration: None,
            disclaimer: None,
            image_url: None,
            is_active: None,
        }
    }

    #[test]
    fn test_time_slot_parsing() {
        assert_eq!("9:00am - 12:00pm".parse::<TimeSlot>().unwrap(), TimeSlot::Morning);
        assert_eq!("afternoon".parse::<TimeSlot>().unwrap(), TimeSlot::Afternoon);
        assert_eq!(" EVENING ".parse::<TimeSlot>().unwrap(), TimeSlot::Evening);
        assert!("midnight".parse::<TimeSlot>().is_err());
    }

    #[test]
    fn test_arrival_window_serializes_plain_date_and_label() {
        let window = ArrivalWindow::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            TimeSlot::Morning,
        );
        let json = serde_json::to_value(&window).unwrap();
        assert_eq!(json["date"], "2024-06-01");
        assert_eq!(json["time"], "9:00am - 12:00pm");
        assert!(json.get("timeZone").is_none());
    }

    #[test]
    fn test_arrival_window_reads_browser_timestamp() {
        let window: ArrivalWindow = serde_json::from_str(
            r#"{"date":"2024-06-01T00:00:00.000Z","time":"4:00pm - 7:00pm"}"#,
        )
        .unwrap();
        assert_eq!(window.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(window.time, TimeSlot::Evening);

        let bad = serde_json::from_str::<ArrivalWindow>(r#"{"date":"soon","time":"Morning"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_arrival_window_patch_keeps_untouched_fields() {
        let mut window = ArrivalWindow::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            TimeSlot::Morning,
        );
        window.apply(ArrivalWindowPatch {
            time: Some(TimeSlot::Evening),
            ..Default::default()
        });
        assert_eq!(window.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(window.time, TimeSlot::Evening);
    }

    #[test]
    fn test_service_price_serializes_as_dollars() {
        let json = serde_json::to_value(sofa()).unwrap();
        assert_eq!(json["price"], 40.0);
        assert!(json.get("imageUrl").is_none());

        let back: Service = serde_json::from_value(json).unwrap();
        assert_eq!(back.price, Money::from_cents(4000));
    }

    #[test]
    fn test_service_patch() {
        let mut service = sofa();
        service.apply(ServicePatch {
            price: Some(Money::from_dollars(45)),
            duration: Some("Up to 1 hour".into()),
            ..Default::default()
        });
        assert_eq!(service.id, "sofa");
        assert_eq!(service.name, "Sofa");
        assert_eq!(service.price, Money::from_dollars(45));
        assert_eq!(service.duration.as_deref(), Some("Up to 1 hour"));
    }

    #[test]
    fn test_timestamp_accepts_millis_and_rfc3339() {
        #[derive(Deserialize)]
        struct Stamp {
            #[serde(with = "timestamp")]
            at: chrono::DateTime<chrono::Utc>,
        }

        let millis: Stamp = serde_json::from_str(r#"{"at":1717200000000}"#).unwrap();
        let text: Stamp = serde_json::from_str(r#"{"at":"2024-06-01T00:00:00Z"}"#).unwrap();
        assert_eq!(millis.at, text.at);
    }

    #[test]
    fn test_booking_status_serialization() {
        assert_eq!(serde_json::to_string(&BookingStatus::Pending).unwrap(), "\"pending\"");
        assert_eq!(BookingStatus::Cancelled.to_string(), "cancelled");
        assert_eq!(BookingStatus::default(), BookingStatus::Pending);
    }
}
