//! Shelter records as returned by the backend, and the editable draft shape.
//!
//! DESIGN
//! ======
//! `Shelter` mirrors the backend JSON (camelCase) and always carries a
//! server-assigned id. `ShelterDraft` is the form-side value: no ids, no
//! timestamp, and signed integers so that out-of-range input survives until
//! validation can report it.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Owner email used for drafts created without a signed-in user email.
pub const DEFAULT_OWNER_EMAIL: &str = "user1@shelter.org";

// =============================================================================
// STATUS
// =============================================================================

/// Operating status of a shelter.
///
/// Values the client does not recognise decode as `Unknown`; a draft carrying
/// `Unknown` does not pass validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShelterStatus {
    #[default]
    Open,
    Closed,
    Crowded,
    #[serde(other)]
    Unknown,
}

impl ShelterStatus {
    /// Statuses a user may pick in the editor.
    pub const SELECTABLE: [Self; 3] = [Self::Open, Self::Closed, Self::Crowded];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::Crowded => "CROWDED",
            Self::Unknown => "UNKNOWN",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Self::Open,
            "CLOSED" => Self::Closed,
            "CROWDED" => Self::Crowded,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn is_selectable(self) -> bool {
        Self::SELECTABLE.contains(&self)
    }
}

// =============================================================================
// PERSISTED RECORD
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub id: Option<u64>,
    pub street: String,
    pub number: u32,
    pub district: String,
    pub city: String,
    pub state: String,
    pub cep: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default)]
    pub id: Option<u64>,
    pub email: String,
    pub phone: String,
}

/// A shelter as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shelter {
    pub id: u64,
    pub name: String,
    pub total_capacity: u32,
    pub current_capacity: u32,
    pub available_resources: String,
    pub status: ShelterStatus,
    /// Server-set timestamp, kept verbatim.
    #[serde(default)]
    pub last_update: Option<String>,
    pub address: Address,
    pub contact: Contact,
    #[serde(default)]
    pub user_email: String,
}

impl Shelter {
    /// `street, number - district, city - state - CEP: cep`
    #[must_use]
    pub fn address_line(&self) -> String {
        let a = &self.address;
        format!("{}, {} - {}, {} - {} - CEP: {}", a.street, a.number, a.district, a.city, a.state, a.cep)
    }

    /// `email | phone`
    #[must_use]
    pub fn contact_line(&self) -> String {
        format!("{} | {}", self.contact.email, self.contact.phone)
    }

    /// Parse `last_update`. Accepts RFC 3339 and offset-less ISO timestamps.
    #[must_use]
    pub fn last_update_at(&self) -> Option<NaiveDateTime> {
        let raw = self.last_update.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }
}

// =============================================================================
// DRAFT
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressDraft {
    pub street: String,
    pub number: i64,
    pub district: String,
    pub city: String,
    pub state: String,
    pub cep: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactDraft {
    pub email: String,
    pub phone: String,
}

/// In-progress shelter value edited by the form. Serialises to the
/// create/update request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShelterDraft {
    pub name: String,
    pub total_capacity: i64,
    pub current_capacity: i64,
    pub available_resources: String,
    pub status: ShelterStatus,
    pub user_email: String,
    pub address: AddressDraft,
    pub contact: ContactDraft,
}

impl ShelterDraft {
    /// Empty draft owned by `email`.
    #[must_use]
    pub fn for_owner(email: &str) -> Self {
        Self { user_email: email.to_owned(), ..Self::default() }
    }
}

impl Default for ShelterDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            total_capacity: 0,
            current_capacity: 0,
            available_resources: String::new(),
            status: ShelterStatus::Open,
            user_email: DEFAULT_OWNER_EMAIL.to_owned(),
            address: AddressDraft::default(),
            contact: ContactDraft::default(),
        }
    }
}

/// Edit-flow seed. An owner the server left blank falls back to
/// [`DEFAULT_OWNER_EMAIL`]; the field is not editable.
impl From<&Shelter> for ShelterDraft {
    fn from(shelter: &Shelter) -> Self {
        Self {
            name: shelter.name.clone(),
            total_capacity: i64::from(shelter.total_capacity),
            current_capacity: i64::from(shelter.current_capacity),
            available_resources: shelter.available_resources.clone(),
            status: shelter.status,
            user_email: if shelter.user_email.trim().is_empty() {
                DEFAULT_OWNER_EMAIL.to_owned()
            } else {
                shelter.user_email.clone()
            },
            address: AddressDraft {
                street: shelter.address.street.clone(),
                number: i64::from(shelter.address.number),
                district: shelter.address.district.clone(),
                city: shelter.address.city.clone(),
                state: shelter.address.state.clone(),
                cep: shelter.address.cep.clone(),
            },
            contact: ContactDraft { email: shelter.contact.email.clone(), phone: shelter.contact.phone.clone() },
        }
    }
}

#[cfg(test)]
#[path = "shelter_test.rs"]
mod tests;
