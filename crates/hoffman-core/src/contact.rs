//! # Contact Info
//!
//! The customer's contact details as a structured record, plus the
//! `"key:value"` string-list encoding the document store expects.
//!
//! ## Two Encodings
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │  ContactInfo (in memory)         encode()          decode()           │
//! │  ─────────────────────────      ─────────►        ◄─────────          │
//! │  first_name: Some("Ada")        ["firstName:Ada",                      │
//! │  last_name:  Some("Byron")       "lastName:Byron",                     │
//! │  email:      Some("a@b.com")     "email:a@b.com"]                      │
//! │  unit:       None               (absent fields are omitted)            │
//! │                                                                       │
//! │  wire_entries()  (what create_booking receives)                       │
//! │  ["name:Ada Byron", "email:a@b.com", "phone:", "address:",            │
//! │   "unit:", "city:", "state:", "zip:"]                                 │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decoding splits each entry at the **first** `:` so values such as
//! `"address:Suite 4: rear door"` survive. Entries without a `:` and
//! unknown keys are ignored.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Contact Field
// =============================================================================

/// The named fields of a contact record, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    Unit,
    City,
    State,
    Zip,
}

impl ContactField {
    pub const ALL: [ContactField; 9] = [
        ContactField::FirstName,
        ContactField::LastName,
        ContactField::Email,
        ContactField::Phone,
        ContactField::Address,
        ContactField::Unit,
        ContactField::City,
        ContactField::State,
        ContactField::Zip,
    ];

    /// Key used in the `"key:value"` encoding and in error `field` values.
    pub fn key(&self) -> &'static str {
        match self {
            ContactField::FirstName => "firstName",
            ContactField::LastName => "lastName",
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Address => "address",
            ContactField::Unit => "unit",
            ContactField::City => "city",
            ContactField::State => "state",
            ContactField::Zip => "zip",
        }
    }

    pub fn from_key(key: &str) -> Option<ContactField> {
        ContactField::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// =============================================================================
// Contact Info
// =============================================================================

/// Structured contact record. Every field is optional until the contact
/// form validates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

impl ContactInfo {
    /// Returns the value of a field.
    pub fn get(&self, field: ContactField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Sets a field.
    pub fn set(&mut self, field: ContactField, value: impl Into<String>) {
        *self.slot_mut(field) = Some(value.into());
    }

    /// Builder-style [`ContactInfo::set`].
    pub fn with(mut self, field: ContactField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Overwrites only the fields present in `patch`.
    pub fn merge(&mut self, patch: ContactInfo) {
        for field in ContactField::ALL {
            if let Some(value) = patch.slot(field).clone() {
                *self.slot_mut(field) = Some(value);
            }
        }
    }

    /// `"firstName lastName"`, trimmed. Empty when neither is set.
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        ContactField::ALL.iter().all(|f| self.slot(*f).is_none())
    }

    // =========================================================================
    // "key:value" encoding
    // =========================================================================

    /// Encodes the set fields as `"key:value"` entries in form order.
    pub fn encode(&self) -> Vec<String> {
        ContactField::ALL
            .iter()
            .filter_map(|f| self.get(*f).map(|v| format!("{}:{}", f.key(), v)))
            .collect()
    }

    /// Decodes `"key:value"` entries. Later duplicates win.
    pub fn decode<S: AsRef<str>>(entries: &[S]) -> ContactInfo {
        let mut info = ContactInfo::default();
        for entry in entries {
            let Some((key, value)) = entry.as_ref().split_once(':') else {
                continue;
            };
            if let Some(field) = ContactField::from_key(key.trim()) {
                info.set(field, value);
            }
        }
        info
    }

    /// The fixed entry list the persistence boundary receives.
    ///
    /// First and last name collapse into a single `name` entry. Missing
    /// fields are sent as empty strings.
    pub fn wire_entries(&self) -> Vec<String> {
        let or_empty = |v: &Option<String>| v.clone().unwrap_or_default();
        vec![
            format!("name:{}", self.full_name()),
            format!("email:{}", or_empty(&self.email)),
            format!("phone:{}", or_empty(&self.phone)),
            format!("address:{}", or_empty(&self.address)),
            format!("unit:{}", or_empty(&self.unit)),
            format!("city:{}", or_empty(&self.city)),
            format!("state:{}", or_empty(&self.state)),
            format!("zip:{}", or_empty(&self.zip)),
        ]
    }

    fn slot(&self, field: ContactField) -> &Option<String> {
        match field {
            ContactField::FirstName => &self.first_name,
            ContactField::LastName => &self.last_name,
            ContactField::Email => &self.email,
            ContactField::Phone => &self.phone,
            ContactField::Address => &self.address,
            ContactField::Unit => &self.unit,
            ContactField::City => &self.city,
            ContactField::State => &self.state,
            ContactField::Zip => &self.zip,
        }
    }

    fn slot_mut(&mut self, field: ContactField) -> &mut Option<String> {
        match field {
            ContactField::FirstName => &mut self.first_name,
            ContactField::LastName => &mut self.last_name,
            ContactField::Email => &mut self.email,
            ContactField::Phone => &mut self.phone,
            ContactField::Address => &mut self.address,
            ContactField::Unit => &mut self.unit,
            ContactField::City => &mut self.city,
            ContactField::State => &mut self.state,
            ContactField::Zip => &mut self.zip,
        }
    }
}

/// Reads a wire entry list (`name`, `email`, ...) into a key/value list,
/// keeping unknown keys. Used when rendering stored bookings.
pub fn decode_wire_entries<S: AsRef<str>>(entries: &[S]) -> Vec<(String, String)> {
    entries
        .iter()
        .filter_map(|e| e.as_ref().split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .collect()
}

/// Looks up a key in a decoded wire entry list.
pub fn wire_value<'a>(entries: &'a [(String, String)], key: &str) -> Option<&'a str> {
    entries
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

// =============================================================================
// Unit Tests
// =============================================================================
