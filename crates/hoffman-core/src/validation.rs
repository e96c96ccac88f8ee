//! # Validation Module
//!
//! Input validation for the booking workspace.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Contact form (rule table, THIS MODULE)                       │
//! │  ├── validate_field / validate_contact_form                            │
//! │  └── Per-field INVALID_FIELD errors for immediate feedback             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Draft store (hoffman-store)                                  │
//! │  └── validate_booking: contact, services, arrival window present       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Persistence boundary (THIS MODULE)                           │
//! │  └── validate_booking_payload: "Validation failed: a, b, c"            │
//! │                                                                         │
//! │  Each layer catches different mistakes                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use hoffman_core::contact::ContactField;
//! use hoffman_core::validation::validate_field;
//!
//! assert!(validate_field(ContactField::Zip, "12345-6789").is_ok());
//! assert!(validate_field(ContactField::State, "ny").is_err());
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::contact::{self, ContactField, ContactInfo};
use crate::error::{BackendError, ValidationError};
use crate::money::Money;
use crate::types::calendar_date;
use crate::wire::BookingPayload;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Patterns
// =============================================================================

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s'-]+$").expect("static regex"));

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\+]?[1-9][\d]{0,15}$|^[\(]?[\d]{3}[\)]?[\s\-]?[\d]{3}[\s\-]?[\d]{4}$")
        .expect("static regex")
});

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));

static STATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}$").expect("static regex"));

static ZIP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("static regex"));

/// True when `email` has the `local@domain.tld` shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

// =============================================================================
// Contact Form Rule Table
// =============================================================================

/// Static rule for one contact form field.
///
/// Checks run in order: required, min length, max length, pattern. The
/// first failure wins. The pattern only applies to non-empty values.
pub struct FieldRule {
    pub field: ContactField,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<&'static Lazy<Regex>>,
    /// Message shown when the pattern does not match.
    pub message: &'static str,
}

/// Rules for the contact step. `unit` has no rule.
pub static CONTACT_FORM_RULES: [FieldRule; 8] = [
    FieldRule {
        field: ContactField::FirstName,
        required: true,
        min_length: Some(2),
        max_length: None,
        pattern: Some(&NAME_PATTERN),
        message: "First name must contain only letters, spaces, hyphens, and apostrophes",
    },
    FieldRule {
        field: ContactField::LastName,
        required: true,
        min_length: Some(2),
        max_length: None,
        pattern: Some(&NAME_PATTERN),
        message: "Last name must contain only letters, spaces, hyphens, and apostrophes",
    },
    FieldRule {
        field: ContactField::Phone,
        required: true,
        min_length: None,
        max_length: None,
        pattern: Some(&PHONE_PATTERN),
        message: "Please enter a valid phone number",
    },
    FieldRule {
        field: ContactField::Email,
        required: true,
        min_length: None,
        max_length: None,
        pattern: Some(&EMAIL_PATTERN),
        message: "Please enter a valid email address",
    },
    FieldRule {
        field: ContactField::Address,
        required: true,
        min_length: Some(5),
        max_length: None,
        pattern: None,
        message: "Please enter a valid street address",
    },
    FieldRule {
        field: ContactField::City,
        required: true,
        min_length: Some(2),
        max_length: None,
        pattern: Some(&NAME_PATTERN),
        message: "City must contain only letters, spaces, hyphens, and apostrophes",
    },
    FieldRule {
        field: ContactField::State,
        required: true,
        min_length: None,
        max_length: None,
        pattern: Some(&STATE_PATTERN),
        message: "State must be a 2-letter abbreviation (e.g., NY)",
    },
    FieldRule {
        field: ContactField::Zip,
        required: true,
        min_length: None,
        max_length: None,
        pattern: Some(&ZIP_PATTERN),
        message: "ZIP code must be in format 12345 or 12345-6789",
    },
];

/// Looks up the rule for a field.
pub fn rule_for(field: ContactField) -> Option<&'static FieldRule> {
    CONTACT_FORM_RULES.iter().find(|r| r.field == field)
}

impl FieldRule {
    /// Checks one value against this rule.
    pub fn check(&self, value: &str) -> ValidationResult<()> {
        let field = self.field.key().to_string();

        if self.required && value.trim().is_empty() {
            return Err(ValidationError::Required { field });
        }

        let len = value.chars().count();
        if let Some(min) = self.min_length {
            if len < min {
                return Err(ValidationError::TooShort { field, min });
            }
        }
        if let Some(max) = self.max_length {
            if len > max {
                return Err(ValidationError::TooLong { field, max });
            }
        }

        if let Some(pattern) = self.pattern {
            if !value.is_empty() && !pattern.is_match(value) {
                return Err(ValidationError::InvalidFormat {
                    field,
                    reason: self.message.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Validates a single contact form field. Fields without a rule always pass.
pub fn validate_field(field: ContactField, value: &str) -> ValidationResult<()> {
    match rule_for(field) {
        Some(rule) => rule.check(value),
        None => Ok(()),
    }
}

/// Runs the whole rule table over a contact record, one error per failing field.
pub fn validate_contact_form(info: &ContactInfo) -> Vec<ValidationError> {
    CONTACT_FORM_RULES
        .iter()
        .filter_map(|rule| rule.check(info.get(rule.field).unwrap_or("")).err())
        .collect()
}

// =============================================================================
// Service Validators
// =============================================================================

/// Validates a service price.
///
/// ## Example
/// ```rust
/// use hoffman_core::money::Money;
/// use hoffman_core::validation::validate_service_price;
///
/// assert!(validate_service_price(Money::zero()).is_ok()); // Custom job
/// assert!(validate_service_price(Money::from_cents(-1)).is_err());
/// ```
pub fn validate_service_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Payload Validation (persistence boundary)
// =============================================================================

/// Validates a payload before it is persisted.
///
/// ## Rules
/// - At least one service
/// - Contact has `name` (or `firstName` + `lastName`), `email` and `phone`
/// - Email has a valid shape
/// - Arrival date and time are present and the date parses
/// - Total is not negative
///
/// All failures are collected into one
/// `BackendError::Validation("Validation failed: a, b")`.
pub fn validate_booking_payload(payload: &BookingPayload) -> Result<(), BackendError> {
    let mut errors: Vec<&str> = Vec::new();

    if payload.services.is_empty() {
        errors.push("At least one service must be selected");
    }

    if payload.contact_info.is_empty() {
        errors.push("Contact information is required");
    } else {
        let entries = contact::decode_wire_entries(&payload.contact_info);
        let present = |key: &str| {
            contact::wire_value(&entries, key)
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false)
        };

        let has_name = present("name") || (present("firstName") && present("lastName"));
        if !has_name {
            errors.push("Contact name is required");
        }
        if !present("email") {
            errors.push("Contact email is required");
        }
        if !present("phone") {
            errors.push("Contact phone is required");
        }
        if let Some(email) = contact::wire_value(&entries, "email") {
            if !email.is_empty() && !is_valid_email(email) {
                errors.push("Invalid email format");
            }
        }
    }

    let window = &payload.arrival_window;
    if window.date.trim().is_empty() {
        errors.push("Arrival date is required");
    } else if calendar_date::parse(&window.date).is_err() {
        errors.push("Invalid arrival date format");
    }
    if window.time.trim().is_empty() {
        errors.push("Arrival time is required");
    }

    if payload.total.is_negative() {
        errors.push("Valid total amount is required");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(BackendError::Validation(format!(
            "Validation failed: {}",
            errors.join(", ")
        )))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{WireArrivalWindow, WireService};

    fn complete_contact() -> ContactInfo {
        ContactInfo {
            first_name: Some("Mary-Jane".into()),
            last_name: Some("O'Neil".into()),
            email: Some("mj@example.com".into()),
            phone: Some("(555) 123-4567".into()),
            address: Some("12 Main Street".into()),
            unit: None,
            city: Some("New York".into()),
            state: Some("NY".into()),
            zip: Some("10001".into()),
        }
    }

    fn payload() -> BookingPayload {
        BookingPayload {
            services: vec![WireService {
                id: "sofa".into(),
                name: "Sofa".into(),
                price: Money::from_dollars(40),
                quantity: 1,
            }],
            contact_info: complete_contact().wire_entries(),
            arrival_window: WireArrivalWindow {
                date: "2024-06-01".into(),
                time: "9:00am - 12:00pm".into(),
            },
            additional_details: None,
            photos: vec![],
            total: Money::from_dollars(40),
        }
    }

    #[test]
    fn test_complete_contact_passes() {
        assert!(validate_contact_form(&complete_contact()).is_empty());
    }

    #[test]
    fn test_rule_order_required_then_length_then_pattern() {
        assert_eq!(
            validate_field(ContactField::FirstName, "  "),
            Err(ValidationError::Required {
                field: "firstName".into()
            })
        );
        assert_eq!(
            validate_field(ContactField::FirstName, "A"),
            Err(ValidationError::TooShort {
                field: "firstName".into(),
                min: 2
            })
        );
        let err = validate_field(ContactField::FirstName, "R2D2").unwrap_err();
        assert_eq!(
            err.to_string(),
            "First name must contain only letters, spaces, hyphens, and apostrophes"
        );
    }

    #[test]
    fn test_phone_and_zip_patterns() {
        assert!(validate_field(ContactField::Phone, "+15551234567").is_ok());
        assert!(validate_field(ContactField::Phone, "555-123-4567").is_ok());
        assert!(validate_field(ContactField::Phone, "call me").is_err());
        assert!(validate_field(ContactField::Zip, "1234").is_err());
        assert!(validate_field(ContactField::State, "NYC").is_err());
    }

    #[test]
    fn test_unit_is_optional() {
        assert!(validate_field(ContactField::Unit, "").is_ok());
        assert!(rule_for(ContactField::Unit).is_none());
    }

    #[test]
    fn test_contact_form_reports_every_failing_field() {
        let mut info = complete_contact();
        info.email = Some("not-an-email".into());
        info.zip = None;
        let errors = validate_contact_form(&info);
        let fields: Vec<&str> = errors.iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["email", "zip"]);
    }

    #[test]
    fn test_valid_payload_passes() {
        assert!(validate_booking_payload(&payload()).is_ok());
    }

    #[test]
    fn test_payload_errors_are_joined() {
        let mut p = payload();
        p.services.clear();
        p.contact_info = vec!["name:".into(), "email:bad".into(), "phone:".into()];
        p.total = Money::from_cents(-1);

        let err = validate_booking_payload(&p).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: At least one service must be selected, \
             Contact name is required, Contact phone is required, \
             Invalid email format, Valid total amount is required"
        );
    }

    #[test]
    fn test_payload_accepts_split_name() {
        let mut p = payload();
        p.contact_info = vec![
            "firstName:Ada".into(),
            "lastName:Byron".into(),
            "email:ada@example.com".into(),
            "phone:5551234567".into(),
        ];
        assert!(validate_booking_payload(&p).is_ok());
    }

    #[test]
    fn test_payload_rejects_bad_date() {
        let mut p = payload();
        p.arrival_window.date = "June first".into();
        let err = validate_booking_payload(&p).unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: Invalid arrival date format");
    }
}
