//! # Booking Repository
//!
//! Database operations for submitted bookings.
//!
//! ## Booking Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Booking Lifecycle                                 │
//! │                                                                         │
//! │  1. SUBMIT                                                             │
//! │     └── insert() → Booking { status: Pending }                         │
//! │                                                                         │
//! │  2. ADMIN REVIEW                                                       │
//! │     └── update_status(Confirmed | Cancelled)                           │
//! │                                                                         │
//! │  3. (OPTIONAL) DELETE                                                  │
//! │     └── delete() → row removed (photos handled by the backend)         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `services`, `contact_info` and `photo_ids` are JSON text columns.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use hoffman_core::contact::{decode_wire_entries, wire_value};
use hoffman_core::types::calendar_date;
use hoffman_core::wire::WireService;
use hoffman_core::{BookingStatus, Money};

// =============================================================================
// Stored Booking
// =============================================================================

/// A persisted booking document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub services: Vec<WireService>,
    /// `"key:value"` entries as submitted.
    pub contact_info: Vec<String>,
    #[serde(with = "calendar_date")]
    pub arrival_date: NaiveDate,
    pub arrival_time: String,
    pub additional_details: String,
    pub photo_ids: Vec<String>,
    pub status: BookingStatus,
    #[serde(with = "hoffman_core::money::as_dollars")]
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Looks up a contact entry (`name`, `email`, `city`, ...).
    pub fn contact_value(&self, key: &str) -> Option<String> {
        let entries = decode_wire_entries(&self.contact_info);
        wire_value(&entries, key).map(str::to_string)
    }

    /// Customer name, or `"Unknown"` when none was given.
    pub fn customer_name(&self) -> String {
        self.contact_value("name")
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Raw row as stored.
#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: String,
    services: String,
    contact_info: String,
    arrival_date: String,
    arrival_time: String,
    additional_details: String,
    photo_ids: String,
    status: BookingStatus,
    total_cents: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = DbError;

    fn try_from(row: BookingRow) -> DbResult<Self> {
        let arrival_date = calendar_date::parse(&row.arrival_date).map_err(DbError::InvalidData)?;
        Ok(Booking {
            id: row.id,
            services: serde_json::from_str(&row.services)?,
            contact_info: serde_json::from_str(&row.contact_info)?,
            arrival_date,
            arrival_time: row.arrival_time,
            additional_details: row.additional_details,
            photo_ids: serde_json::from_str(&row.photo_ids)?,
            status: row.status,
            total: Money::from_cents(row.total_cents),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_BOOKING: &str = r#"
    SELECT
        id, services, contact_info, arrival_date, arrival_time,
        additional_details, photo_ids, status, total_cents,
        created_at, updated_at
    FROM bookings
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for booking database operations.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
}

impl BookingRepository {
    /// Creates a new BookingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookingRepository { pool }
    }

    /// Inserts a booking document.
    pub async fn insert(&self, booking: &Booking) -> DbResult<()> {
        debug!(id = %booking.id, services = booking.services.len(), "Inserting booking");

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, services, contact_info, arrival_date, arrival_time,
                additional_details, photo_ids, status, total_cents,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&booking.id)
        .bind(serde_json::to_string(&booking.services)?)
        .bind(serde_json::to_string(&booking.contact_info)?)
        .bind(booking.arrival_date.format("%Y-%m-%d").to_string())
        .bind(&booking.arrival_time)
        .bind(&booking.additional_details)
        .bind(serde_json::to_string(&booking.photo_ids)?)
        .bind(booking.status)
        .bind(booking.total.cents())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a booking by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(&format!("{} WHERE id = ?1", SELECT_BOOKING))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Booking::try_from).transpose()
    }

    /// Lists all bookings, newest first.
    pub async fn list(&self) -> DbResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "{} ORDER BY created_at DESC, rowid DESC",
            SELECT_BOOKING
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    /// Sets a booking's status and returns the updated booking.
    pub async fn update_status(&self, id: &str, status: BookingStatus) -> DbResult<Booking> {
        debug!(id = %id, status = %status, "Updating booking status");

        let result = sqlx::query("UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Booking", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Booking", id))
    }

    /// Deletes a booking document.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting booking");

        let result = sqlx::query("DELETE FROM bookings WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Booking", id));
        }
        Ok(())
    }

    /// Number of stored bookings.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
