//! Draft and credential validation.
//!
//! DESIGN
//! ======
//! Each field has its own check returning `Result<(), &'static str>`. The
//! aggregate validators run every check in field order and collect failures
//! into an ordered field → message mapping. At most one message is kept per
//! field; the first entry is what the UI shows as the blocking alert.
//!
//! Validation is pure: the same draft always yields the same mapping.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use validator::ValidateEmail;

use crate::shelter::{ShelterDraft, ShelterStatus};

/// Maximum length of the postal-code input, dash included.
pub const CEP_MAX_LEN: usize = 9;
const CEP_DIGITS: usize = 8;
const CEP_DASH_AFTER: usize = 5;

static CEP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}-?\d{3}$").expect("valid regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}\s?(9\d{4}-?\d{4}|\d{4}-?\d{4})$").expect("valid regex"));

// =============================================================================
// FIELD PATHS
// =============================================================================

/// Dotted path of a shelter form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldPath {
    Name,
    TotalCapacity,
    CurrentCapacity,
    AvailableResources,
    Status,
    UserEmail,
    AddressStreet,
    AddressNumber,
    AddressDistrict,
    AddressCity,
    AddressState,
    AddressCep,
    ContactEmail,
    ContactPhone,
}

impl FieldPath {
    pub const ALL: [Self; 14] = [
        Self::Name,
        Self::TotalCapacity,
        Self::CurrentCapacity,
        Self::AvailableResources,
        Self::Status,
        Self::UserEmail,
        Self::AddressStreet,
        Self::AddressNumber,
        Self::AddressDistrict,
        Self::AddressCity,
        Self::AddressState,
        Self::AddressCep,
        Self::ContactEmail,
        Self::ContactPhone,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::TotalCapacity => "totalCapacity",
            Self::CurrentCapacity => "currentCapacity",
            Self::AvailableResources => "availableResources",
            Self::Status => "status",
            Self::UserEmail => "userEmail",
            Self::AddressStreet => "address.street",
            Self::AddressNumber => "address.number",
            Self::AddressDistrict => "address.district",
            Self::AddressCity => "address.city",
            Self::AddressState => "address.state",
            Self::AddressCep => "address.cep",
            Self::ContactEmail => "contact.email",
            Self::ContactPhone => "contact.phone",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|path| path.as_str() == raw)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field of the login and signup forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialField {
    Name,
    Email,
    Password,
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Password => "password",
        })
    }
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// Ordered field → message mapping produced by a failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<F> {
    entries: Vec<(F, String)>,
}

pub type ValidationErrors = FieldErrors<FieldPath>;
pub type CredentialErrors = FieldErrors<CredentialField>;

impl<F: Copy + PartialEq> FieldErrors<F> {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Record `message` for `field` unless the field already has one.
    pub fn push(&mut self, field: F, message: &str) {
        if !self.contains(field) {
            self.entries.push((field, message.to_owned()));
        }
    }

    fn record(&mut self, field: F, check: Result<(), &'static str>) {
        if let Err(message) = check {
            self.push(field, message);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn contains(&self, field: F) -> bool {
        self.entries.iter().any(|(f, _)| *f == field)
    }

    #[must_use]
    pub fn get(&self, field: F) -> Option<&str> {
        self.entries.iter().find(|(f, _)| *f == field).map(|(_, m)| m.as_str())
    }

    /// The entry surfaced as the blocking notification.
    #[must_use]
    pub fn first(&self) -> Option<(F, &str)> {
        self.entries.first().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn remove(&mut self, field: F) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(f, _)| *f != field);
        before != self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &str)> {
        self.entries.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl<F: Copy + PartialEq + fmt::Display> FieldErrors<F> {
    /// Dotted path → message, for serialisation and display.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries.iter().map(|(f, m)| (f.to_string(), m.clone())).collect()
    }
}

impl<F: Copy + PartialEq> Default for FieldErrors<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: fmt::Display> fmt::Display for FieldErrors<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl<F: fmt::Debug + fmt::Display> std::error::Error for FieldErrors<F> {}

// =============================================================================
// FIELD CHECKS
// =============================================================================

fn required_text(value: &str, min: usize, empty: &'static str, short: &'static str) -> Result<(), &'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    if trimmed.chars().count() < min {
        return Err(short);
    }
    Ok(())
}

pub fn check_name(value: &str) -> Result<(), &'static str> {
    required_text(value, 3, "Nome não pode estar vazio", "Nome deve ter pelo menos 3 caracteres")
}

pub fn check_total_capacity(value: i64) -> Result<(), &'static str> {
    if value < 0 { Err("Capacidade total não pode ser negativa") } else { Ok(()) }
}

pub fn check_current_capacity(value: i64) -> Result<(), &'static str> {
    if value < 0 { Err("Capacidade atual não pode ser negativa") } else { Ok(()) }
}

pub fn check_capacity_bounds(current: i64, total: i64) -> Result<(), &'static str> {
    if current > total { Err("Capacidade atual não pode ser maior que a capacidade total") } else { Ok(()) }
}

pub fn check_available_resources(value: &str) -> Result<(), &'static str> {
    required_text(
        value,
        3,
        "Recursos disponíveis não pode estar vazio",
        "Recursos disponíveis deve ter pelo menos 3 caracteres",
    )
}

pub fn check_status(value: ShelterStatus) -> Result<(), &'static str> {
    if value.is_selectable() { Ok(()) } else { Err("Status deve ser OPEN, CLOSED ou CROWDED") }
}

pub fn check_email(value: &str) -> Result<(), &'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("Email não pode estar vazio");
    }
    if trimmed.validate_email() { Ok(()) } else { Err("Email inválido") }
}

pub fn check_street(value: &str) -> Result<(), &'static str> {
    required_text(value, 3, "Rua não pode estar vazia", "Rua deve ter pelo menos 3 caracteres")
}

pub fn check_number(value: i64) -> Result<(), &'static str> {
    if value < 1 { Err("Número deve ser maior que 0") } else { Ok(()) }
}

pub fn check_district(value: &str) -> Result<(), &'static str> {
    required_text(value, 3, "Bairro não pode estar vazio", "Bairro deve ter pelo menos 3 caracteres")
}

pub fn check_city(value: &str) -> Result<(), &'static str> {
    required_text(value, 3, "Cidade não pode estar vazia", "Cidade deve ter pelo menos 3 caracteres")
}

pub fn check_state(value: &str) -> Result<(), &'static str> {
    required_text(value, 2, "Estado não pode estar vazio", "Estado deve ter pelo menos 2 caracteres")
}

pub fn check_cep(value: &str) -> Result<(), &'static str> {
    if CEP_RE.is_match(value) { Ok(()) } else { Err("CEP deve ter o formato 00000-000 ou 00000000") }
}

pub fn check_phone(value: &str) -> Result<(), &'static str> {
    if PHONE_RE.is_match(value) { Ok(()) } else { Err("Telefone deve ter o formato (11) 99999-9999") }
}

// =============================================================================
// AGGREGATE VALIDATORS
// =============================================================================

/// Validate a shelter draft.
///
/// # Errors
///
/// Returns every failing field with its message, in form order. The
/// capacity comparison always runs and attaches to `currentCapacity`.
pub fn validate_shelter(draft: &ShelterDraft) -> Result<(), ValidationErrors> {
    validate_shelter_input(draft, &[])
}

/// Validate a draft whose numeric fields listed in `non_integer` were typed
/// with a fractional part. Those fields report [`integer_message`] ahead of
/// their other checks.
///
/// # Errors
///
/// Same mapping as [`validate_shelter`].
pub fn validate_shelter_input(draft: &ShelterDraft, non_integer: &[FieldPath]) -> Result<(), ValidationErrors> {
    let integral = |field: FieldPath| match integer_message(field) {
        Some(message) if non_integer.contains(&field) => Err(message),
        _ => Ok(()),
    };
    let mut errors = ValidationErrors::new();

    errors.record(FieldPath::Name, check_name(&draft.name));
    errors.record(FieldPath::TotalCapacity, integral(FieldPath::TotalCapacity));
    errors.record(FieldPath::TotalCapacity, check_total_capacity(draft.total_capacity));
    errors.record(FieldPath::CurrentCapacity, integral(FieldPath::CurrentCapacity));
    errors.record(FieldPath::CurrentCapacity, check_current_capacity(draft.current_capacity));
    errors.record(FieldPath::AvailableResources, check_available_resources(&draft.available_resources));
    errors.record(FieldPath::Status, check_status(draft.status));
    errors.record(FieldPath::UserEmail, check_email(&draft.user_email));

    let address = &draft.address;
    errors.record(FieldPath::AddressStreet, check_street(&address.street));
    errors.record(FieldPath::AddressNumber, integral(FieldPath::AddressNumber));
    errors.record(FieldPath::AddressNumber, check_number(address.number));
    errors.record(FieldPath::AddressDistrict, check_district(&address.district));
    errors.record(FieldPath::AddressCity, check_city(&address.city));
    errors.record(FieldPath::AddressState, check_state(&address.state));
    errors.record(FieldPath::AddressCep, check_cep(&address.cep));

    errors.record(FieldPath::ContactEmail, check_email(&draft.contact.email));
    errors.record(FieldPath::ContactPhone, check_phone(&draft.contact.phone));

    errors.record(FieldPath::CurrentCapacity, check_capacity_bounds(draft.current_capacity, draft.total_capacity));

    errors.into_result()
}

fn check_password(value: &str) -> Result<(), &'static str> {
    if value.chars().count() < 6 { Err("Senha precisa ter pelo menos 6 caracteres") } else { Ok(()) }
}

fn check_login_email(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Email é obrigatório");
    }
    if value.trim().validate_email() { Ok(()) } else { Err("Email inválido") }
}

/// Validate login credentials.
///
/// # Errors
///
/// Returns the failing fields (`email`, `password`).
pub fn validate_login(email: &str, password: &str) -> Result<(), CredentialErrors> {
    let mut errors = CredentialErrors::new();
    errors.record(CredentialField::Email, check_login_email(email));
    errors.record(CredentialField::Password, check_password(password));
    errors.into_result()
}

/// Validate signup input: display name 2-50 characters plus login rules.
///
/// # Errors
///
/// Returns the failing fields (`name`, `email`, `password`).
pub fn validate_signup(name: &str, email: &str, password: &str) -> Result<(), CredentialErrors> {
    let mut errors = CredentialErrors::new();
    let name_len = name.trim().chars().count();
    if name_len < 2 {
        errors.push(CredentialField::Name, "Nome deve ter pelo menos 2 caracteres");
    } else if name_len > 50 {
        errors.push(CredentialField::Name, "Nome muito longo");
    }
    errors.record(CredentialField::Email, check_login_email(email));
    errors.record(CredentialField::Password, check_password(password));
    errors.into_result()
}

// =============================================================================
// INPUT FORMATTING
// =============================================================================

/// Reformat raw postal-code input: digits only, dash after the fifth digit,
/// at most nine characters.
#[must_use]
pub fn format_cep(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).take(CEP_DIGITS).collect();
    if digits.len() > CEP_DASH_AFTER {
        let (head, tail) = digits.split_at(CEP_DASH_AFTER);
        format!("{head}-{tail}")
    } else {
        digits
    }
}

/// Read numeric text input: trimmed decimal or exponent notation, 0 when it
/// is empty or not a finite number.
#[must_use]
pub fn parse_number(raw: &str) -> f64 {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// `parse_number` truncated toward zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn coerce_integer(raw: &str) -> i64 {
    parse_number(raw).trunc() as i64
}

/// Error for a numeric field whose input had a fractional part.
#[must_use]
pub fn integer_message(field: FieldPath) -> Option<&'static str> {
    match field {
        FieldPath::TotalCapacity => Some("Capacidade total deve ser um número inteiro"),
        FieldPath::CurrentCapacity => Some("Capacidade atual deve ser um número inteiro"),
        FieldPath::AddressNumber => Some("Número deve ser um número inteiro"),
        _ => None,
    }
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod tests;
