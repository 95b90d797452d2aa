//! Shelter editor — the reusable create/edit form state.
//!
//! DESIGN
//! ======
//! The editor owns a strongly-typed `ShelterDraft`, the current field errors,
//! and a pending flag. Input arrives as raw text through one setter per
//! section (top level, address, contact); numeric inputs are read as numbers
//! and truncated, remembering which ones had a fractional part, and the
//! postal code is reformatted on every keystroke. Editing a field clears that
//! field's error.
//!
//! Submission validates synchronously. On failure the first message is
//! raised as a blocking notice and the callback never runs. On success the
//! errors are cleared and the callback receives the validated draft while
//! the pending flag is held.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::notice::Notifier;
use crate::shelter::{ShelterDraft, ShelterStatus};
use crate::validation::{self, FieldPath, ValidationErrors};

pub const VALIDATION_TITLE: &str = "Erro de Validação";

// =============================================================================
// FIELDS
// =============================================================================

/// Top-level text inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShelterField {
    Name,
    TotalCapacity,
    CurrentCapacity,
    AvailableResources,
    UserEmail,
}

impl ShelterField {
    #[must_use]
    pub fn path(self) -> FieldPath {
        match self {
            Self::Name => FieldPath::Name,
            Self::TotalCapacity => FieldPath::TotalCapacity,
            Self::CurrentCapacity => FieldPath::CurrentCapacity,
            Self::AvailableResources => FieldPath::AvailableResources,
            Self::UserEmail => FieldPath::UserEmail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    Street,
    Number,
    District,
    City,
    State,
    Cep,
}

impl AddressField {
    #[must_use]
    pub fn path(self) -> FieldPath {
        match self {
            Self::Street => FieldPath::AddressStreet,
            Self::Number => FieldPath::AddressNumber,
            Self::District => FieldPath::AddressDistrict,
            Self::City => FieldPath::AddressCity,
            Self::State => FieldPath::AddressState,
            Self::Cep => FieldPath::AddressCep,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Email,
    Phone,
}

impl ContactField {
    #[must_use]
    pub fn path(self) -> FieldPath {
        match self {
            Self::Email => FieldPath::ContactEmail,
            Self::Phone => FieldPath::ContactPhone,
        }
    }
}

// =============================================================================
// PENDING FLAG
// =============================================================================

/// Shared in-flight marker. Clones observe the same flag, so a view can grey
/// out its submit control while a mutation runs.
#[derive(Debug, Clone, Default)]
pub struct PendingFlag(Arc<AtomicBool>);

impl PendingFlag {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Claim the flag. `None` when another submission holds it.
    #[must_use]
    pub fn try_begin(&self) -> Option<PendingGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PendingGuard(Arc::clone(&self.0)))
    }
}

/// Releases the pending flag on drop, including when the submit future is
/// dropped mid-flight.
#[derive(Debug)]
pub struct PendingGuard(Arc<AtomicBool>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// =============================================================================
// SUBMIT ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SubmitError<E> {
    #[error("a submission is already in progress")]
    Busy,
    #[error("validation failed: {0}")]
    Invalid(ValidationErrors),
    #[error("{0}")]
    Rejected(E),
}

// =============================================================================
// EDITOR
// =============================================================================

#[derive(Debug, Default)]
pub struct ShelterEditor {
    draft: ShelterDraft,
    errors: ValidationErrors,
    non_integer: Vec<FieldPath>,
    pending: PendingFlag,
}

impl ShelterEditor {
    /// Editor over an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Editor seeded with existing values (edit flow) or an owner-stamped
    /// empty draft (create flow).
    #[must_use]
    pub fn with_initial(draft: ShelterDraft) -> Self {
        Self { draft, ..Self::default() }
    }

    #[must_use]
    pub fn draft(&self) -> &ShelterDraft {
        &self.draft
    }

    #[must_use]
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    #[must_use]
    pub fn field_error(&self, path: FieldPath) -> Option<&str> {
        self.errors.get(path)
    }

    #[must_use]
    pub fn pending(&self) -> PendingFlag {
        self.pending.clone()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn set_field(&mut self, field: ShelterField, input: &str) {
        self.errors.remove(field.path());
        match field {
            ShelterField::Name => self.draft.name = input.to_owned(),
            ShelterField::TotalCapacity => {
                let value = self.number_input(field.path(), input);
                self.draft.total_capacity = value;
            }
            ShelterField::CurrentCapacity => {
                let value = self.number_input(field.path(), input);
                self.draft.current_capacity = value;
            }
            ShelterField::AvailableResources => self.draft.available_resources = input.to_owned(),
            ShelterField::UserEmail => self.draft.user_email = input.to_owned(),
        }
    }

    pub fn set_status(&mut self, status: ShelterStatus) {
        self.errors.remove(FieldPath::Status);
        self.draft.status = status;
    }

    pub fn set_address(&mut self, field: AddressField, input: &str) {
        self.errors.remove(field.path());
        let address = &mut self.draft.address;
        match field {
            AddressField::Street => address.street = input.to_owned(),
            AddressField::Number => {
                let value = self.number_input(field.path(), input);
                self.draft.address.number = value;
            }
            AddressField::District => address.district = input.to_owned(),
            AddressField::City => address.city = input.to_owned(),
            AddressField::State => address.state = input.to_owned(),
            AddressField::Cep => address.cep = validation::format_cep(input),
        }
    }

    pub fn set_contact(&mut self, field: ContactField, input: &str) {
        self.errors.remove(field.path());
        let contact = &mut self.draft.contact;
        match field {
            ContactField::Email => contact.email = input.to_owned(),
            ContactField::Phone => contact.phone = input.to_owned(),
        }
    }

    fn number_input(&mut self, path: FieldPath, input: &str) -> i64 {
        self.non_integer.retain(|p| *p != path);
        if validation::parse_number(input).fract().abs() > 0.0 {
            self.non_integer.push(path);
        }
        validation::coerce_integer(input)
    }

    /// Validate the draft and record the outcome in the field errors.
    ///
    /// # Errors
    ///
    /// Returns the full error mapping when any field fails.
    pub fn validate(&mut self) -> Result<(), ValidationErrors> {
        match validation::validate_shelter_input(&self.draft, &self.non_integer) {
            Ok(()) => {
                self.errors.clear();
                Ok(())
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    /// Validate, then hand the draft to `on_submit` while holding the pending
    /// flag. Invalid drafts raise the first message through `notifier` and
    /// never reach the callback.
    ///
    /// # Errors
    ///
    /// `Busy` if another submission is in flight, `Invalid` on validation
    /// failure, `Rejected` with the callback's own error.
    pub async fn submit<F, Fut, T, E>(&mut self, notifier: &Notifier, on_submit: F) -> Result<T, SubmitError<E>>
    where
        F: FnOnce(ShelterDraft) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(_guard) = self.pending.try_begin() else {
            return Err(SubmitError::Busy);
        };

        if let Err(errors) = self.validate() {
            if let Some((_, message)) = errors.first() {
                notifier.error(VALIDATION_TITLE, message);
            }
            return Err(SubmitError::Invalid(errors));
        }

        on_submit(self.draft.clone()).await.map_err(SubmitError::Rejected)
    }
}

#[cfg(test)]
#[path = "editor_test.rs"]
mod tests;
