//! # Email Notifier
//!
//! Sends the admin a "new booking" email through a transactional email
//! HTTP API (`POST {api_base_url}/emails`, bearer auth).
//!
//! ```text
//! SqliteBookingBackend ──► Notifier::booking_created(&Booking)
//!                                │
//!                                ▼
//!                          EmailNotifier
//!                          ├── subject: "New Booking: <name> - <date>"
//!                          ├── text + html bodies
//!                          └── POST /emails ──✗──► NotifyError (logged by caller)
//! ```

use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::NotificationSettings;
use hoffman_db::{Booking, Notifier, NotifyError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONFIRMATION_NOTICE: &str =
    "This booking requires confirmation. Please contact the customer to confirm the appointment details.";

// =============================================================================
// Request / Response
// =============================================================================

#[derive(Debug, Serialize)]
struct EmailTag {
    name: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
    text: String,
    tags: Vec<EmailTag>,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

// =============================================================================
// Notifier
// =============================================================================

/// Emails the admin for every new booking.
#[derive(Debug, Clone)]
pub struct EmailNotifier {
    http: Client,
    settings: NotificationSettings,
}

impl EmailNotifier {
    pub fn new(settings: NotificationSettings) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("hoffman-booking/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NotifyError::Configuration(e.to_string()))?;

        Ok(EmailNotifier { http, settings })
    }

    fn endpoint(&self) -> String {
        format!("{}/emails", self.settings.api_base_url.trim_end_matches('/'))
    }

    fn build_request(&self, booking: &Booking) -> Result<(String, SendEmailRequest), NotifyError> {
        let api_key = self
            .settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| NotifyError::Configuration("email API key is required".into()))?;

        let admin = self
            .settings
            .admin_email
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| NotifyError::Configuration("admin email is required".into()))?;

        let request = SendEmailRequest {
            from: self.settings.from.clone(),
            to: vec![admin],
            subject: render_subject(booking),
            html: render_html(booking),
            text: render_text(booking),
            tags: vec![
                EmailTag {
                    name: "category",
                    value: "booking-notification".into(),
                },
                EmailTag {
                    name: "booking-id",
                    value: booking.id.clone(),
                },
            ],
        };

        Ok((api_key, request))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn booking_created(&self, booking: &Booking) -> Result<(), NotifyError> {
        let (api_key, request) = self.build_request(booking)?;

        debug!(booking = %booking.id, endpoint = %self.endpoint(), "Sending booking email");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Delivery(format!("http {}: {}", status.as_u16(), body)));
        }

        let sent: SendEmailResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        info!(booking = %booking.id, message_id = ?sent.id, "Booking email sent");
        Ok(())
    }
}

// =============================================================================
// Rendering
// =============================================================================

struct ContactView {
    name: String,
    email: String,
    phone: String,
    address: Option<String>,
    locality: String,
}

impl ContactView {
    fn of(booking: &Booking) -> Self {
        let value = |key: &str| booking.contact_value(key).unwrap_or_default();

        let address = booking
            .contact_value("address")
            .filter(|a| !a.trim().is_empty())
            .map(|address| match booking.contact_value("unit").filter(|u| !u.is_empty()) {
                Some(unit) => format!("{}, {}", address, unit),
                None => address,
            });

        ContactView {
            name: booking.customer_name(),
            email: value("email"),
            phone: value("phone"),
            address,
            locality: format!("{}, {} {}", value("city"), value("state"), value("zip")),
        }
    }
}

/// Arrival date as `Saturday, June 1, 2024`.
fn long_date(booking: &Booking) -> String {
    booking.arrival_date.format("%A, %B %-d, %Y").to_string()
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub fn render_subject(booking: &Booking) -> String {
    format!("New Booking: {} - {}", booking.customer_name(), long_date(booking))
}

pub fn render_text(booking: &Booking) -> String {
    let contact = ContactView::of(booking);
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "NEW BOOKING RECEIVED - HOFFMAN CLEANING");
    let _ = writeln!(out);
    let _ = writeln!(out, "Booking ID: {}", booking.id);
    let _ = writeln!(out, "Status: Pending Confirmation");
    let _ = writeln!(out, "Received: {}", booking.created_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out);
    let _ = writeln!(out, "APPOINTMENT DETAILS");
    let _ = writeln!(out, "Date: {}", long_date(booking));
    let _ = writeln!(out, "Time: {}", booking.arrival_time);
    let _ = writeln!(out);
    let _ = writeln!(out, "CUSTOMER INFORMATION");
    let _ = writeln!(out, "Name: {}", contact.name);
    let _ = writeln!(out, "Email: {}", contact.email);
    let _ = writeln!(out, "Phone: {}", contact.phone);
    if let Some(address) = &contact.address {
        let _ = writeln!(out, "Address: {}", address);
        let _ = writeln!(out, "         {}", contact.locality);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "SELECTED SERVICES");
    for (index, service) in booking.services.iter().enumerate() {
        let _ = writeln!(out, "{}. {} - {}", index + 1, service.name, service.price);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "PRICING SUMMARY");
    let _ = writeln!(out, "Total: {}", booking.total);

    if !booking.additional_details.trim().is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "ADDITIONAL DETAILS");
        let _ = writeln!(out, "{}", booking.additional_details);
    }

    let photos = booking.photo_ids.len();
    if photos > 0 {
        let _ = writeln!(out);
        let _ = writeln!(out, "PHOTOS");
        let _ = writeln!(out, "{} reference photo{} uploaded", photos, plural(photos));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", CONFIRMATION_NOTICE);
    let _ = writeln!(out);
    let _ = writeln!(out, "---");
    let _ = writeln!(out, "Hoffman Cleaning");
    let _ = write!(out, "Automated Booking Notification");
    out
}

pub fn render_html(booking: &Booking) -> String {
    let contact = ContactView::of(booking);
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<div class="header"><h1>New Booking Received</h1><div class="booking-id">Booking ID: {id}</div></div>"#,
        id = escape_html(&booking.id)
    );

    let _ = write!(
        body,
        r#"<div class="section"><h2>Appointment Details</h2><p><strong>Date:</strong> {date}</p><p><strong>Time:</strong> {time}</p></div>"#,
        date = long_date(booking),
        time = escape_html(&booking.arrival_time)
    );

    let _ = write!(
        body,
        r#"<div class="section"><h2>Customer Information</h2><p><strong>Name:</strong> {name}</p><p><strong>Email:</strong> {email}</p><p><strong>Phone:</strong> {phone}</p>"#,
        name = escape_html(&contact.name),
        email = escape_html(&contact.email),
        phone = escape_html(&contact.phone)
    );
    if let Some(address) = &contact.address {
        let _ = write!(
            body,
            r#"<p><strong>Service Address:</strong> {}<br>{}</p>"#,
            escape_html(address),
            escape_html(&contact.locality)
        );
    }
    body.push_str("</div>");

    body.push_str(r#"<div class="section"><h2>Selected Services</h2><ul>"#);
    for service in &booking.services {
        let _ = write!(
            body,
            "<li>{} <strong>{}</strong></li>",
            escape_html(&service.name),
            service.price
        );
    }
    let _ = write!(
        body,
        r#"</ul><p class="total"><strong>Total Amount:</strong> {}</p></div>"#,
        booking.total
    );

    if !booking.additional_details.trim().is_empty() {
        let _ = write!(
            body,
            r#"<div class="section"><h2>Additional Details</h2><p>{}</p></div>"#,
            escape_html(&booking.additional_details).replace('\n', "<br>")
        );
    }

    let photos = booking.photo_ids.len();
    if photos > 0 {
        let _ = write!(
            body,
            r#"<div class="section"><h2>Reference Photos</h2><p>{} photo{} uploaded by customer</p></div>"#,
            photos,
            plural(photos)
        );
    }

    let _ = write!(body, r#"<div class="alert">{}</div>"#, CONFIRMATION_NOTICE);

    format!(
        concat!(
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\">",
            "<title>New Booking</title></head><body>{}",
            "<div class=\"footer\"><p><strong>Hoffman Cleaning</strong></p>",
            "<p>This is an automated notification from the booking system.</p></div>",
            "</body></html>"
        ),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use hoffman_core::wire::WireService;
    use hoffman_core::{BookingStatus, Money};

    fn booking() -> Booking {
        let now = Utc::now();
        Booking {
            id: "b-123".into(),
            services: vec![
                WireService {
                    id: "sofa".into(),
                    name: "Sofa".into(),
                    price: Money::from_cents(12_500),
                    quantity: 1,
                },
                WireService {
                    id: "rug".into(),
                    name: "Rug <large>".into(),
                    price: Money::from_dollars(50),
                    quantity: 1,
                },
            ],
            contact_info: vec![
                "name:Ada Byron".into(),
                "email:ada@example.com".into(),
                "phone:555-123-4567".into(),
                "address:1 Main St".into(),
                "unit:Apt 2".into(),
                "city:Springfield".into(),
                "state:IL".into(),
                "zip:62701".into(),
            ],
            arrival_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            arrival_time: "9:00am - 12:00pm".into(),
            additional_details: "Dog in yard\nUse side gate".into(),
            photo_ids: vec!["p-1".into()],
            status: BookingStatus::Pending,
            total: Money::from_cents(17_500),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_subject() {
        assert_eq!(
            render_subject(&booking()),
            "New Booking: Ada Byron - Saturday, June 1, 2024"
        );
    }

    #[test]
    fn test_text_body() {
        let text = render_text(&booking());
        assert!(text.starts_with("NEW BOOKING RECEIVED - HOFFMAN CLEANING"));
        assert!(text.contains("Booking ID: b-123"));
        assert!(text.contains("Address: 1 Main St, Apt 2"));
        assert!(text.contains("Springfield, IL 62701"));
        assert!(text.contains("1. Sofa - $125.00"));
        assert!(text.contains("Total: $175.00"));
        assert!(text.contains("ADDITIONAL DETAILS\nDog in yard"));
        assert!(text.contains("1 reference photo uploaded"));
    }

    #[test]
    fn test_text_body_without_optional_sections() {
        let mut b = booking();
        b.contact_info.retain(|e| !e.starts_with("address:"));
        b.additional_details.clear();
        b.photo_ids.clear();

        let text = render_text(&b);
        assert!(!text.contains("Address:"));
        assert!(!text.contains("ADDITIONAL DETAILS"));
        assert!(!text.contains("PHOTOS"));
    }

    #[test]
    fn test_html_body_escapes_input() {
        let html = render_html(&booking());
        assert!(html.contains("Rug &lt;large&gt;"));
        assert!(html.contains("Dog in yard<br>Use side gate"));
        assert!(html.contains("1 photo uploaded by customer"));
        assert!(!html.contains("<large>"));
    }

    #[tokio::test]
    async fn test_missing_configuration_is_an_error() {
        let notifier = EmailNotifier::new(NotificationSettings {
            enabled: true,
            admin_email: Some("office@example.com".into()),
            ..NotificationSettings::default()
        })
        .unwrap();

        let err = notifier.booking_created(&booking()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Configuration(_)));

        let notifier = EmailNotifier::new(NotificationSettings {
            enabled: true,
            api_key: Some("re_test".into()),
            ..NotificationSettings::default()
        })
        .unwrap();

        let err = notifier.booking_created(&booking()).await.unwrap_err();
        assert_eq!(err.to_string(), "Notifier not configured: admin email is required");
    }

    #[test]
    fn test_request_shape() {
        let notifier = EmailNotifier::new(NotificationSettings {
            enabled: true,
            admin_email: Some("office@example.com".into()),
            api_key: Some("re_test".into()),
            api_base_url: "http://localhost:8025/".into(),
            ..NotificationSettings::default()
        })
        .unwrap();

        assert_eq!(notifier.endpoint(), "http://localhost:8025/emails");

        let (key, request) = notifier.build_request(&booking()).unwrap();
        assert_eq!(key, "re_test");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["to"][0], "office@example.com");
        assert_eq!(json["tags"][1]["value"], "b-123");
    }
}
