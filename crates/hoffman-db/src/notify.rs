//! # Booking Notifications
//!
//! Called once per created booking. Delivery is best-effort: the backend
//! logs a notifier error and still reports the booking as created.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::repository::booking::Booking;

/// Notification delivery errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Notifier is missing an API key, recipient, ...
    #[error("Notifier not configured: {0}")]
    Configuration(String),

    /// The delivery channel rejected or dropped the message.
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Receives newly created bookings (implemented by the email integration).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn booking_created(&self, booking: &Booking) -> Result<(), NotifyError>;
}

/// Writes a log line per booking. Used when email is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn booking_created(&self, booking: &Booking) -> Result<(), NotifyError> {
        info!(
            id = %booking.id,
            customer = %booking.customer_name(),
            date = %booking.arrival_date,
            time = %booking.arrival_time,
            total = %booking.total,
            photos = booking.photo_ids.len(),
            "New booking received"
        );
        Ok(())
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn booking_created(&self, _booking: &Booking) -> Result<(), NotifyError> {
        Ok(())
    }
}
