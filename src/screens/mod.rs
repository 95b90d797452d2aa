//! Screen controllers — the app's screens without rendering.
//!
//! DESIGN
//! ======
//! Each screen is a plain struct owning its transient state (view state,
//! draft, pending flag) and a `ScreenContext` clone. The context is passed
//! explicitly; there is no ambient global session. Screens talk to the
//! backend through `ShelterApi`, read through the shared `QueryCache`, and
//! raise blocking notices through the `Notifier`.
//!
//! LATE RESPONSES
//! ==============
//! Navigating away does not cancel in-flight requests. Each screen carries a
//! `Mount`; once unmounted, a response that arrives still updates the cache
//! but raises no notice and performs no navigation.

pub mod auth;
pub mod directory;
pub mod menu;
pub mod profile;
pub mod shelter_form;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::cache::QueryCache;
use crate::gateway::{GatewayError, ShelterApi};
use crate::identity::{IdentityError, IdentityProvider, Session};
use crate::notice::Notifier;
use crate::validation::{CredentialErrors, ValidationErrors};

pub use auth::{LoginScreen, SignupScreen, WelcomeScreen};
pub use directory::{DirectoryView, ShelterCard, ShelterDirectory};
pub use menu::{Menu, MenuItem};
pub use profile::{ProfileDetails, ProfileScreen};
pub use shelter_form::{CreateShelterScreen, EditShelterScreen, EditView};

pub const ERROR_TITLE: &str = "Erro";
pub const SUCCESS_TITLE: &str = "Sucesso!";

// =============================================================================
// CONTEXT
// =============================================================================

/// Collaborators every screen needs, threaded explicitly.
#[derive(Clone)]
pub struct ScreenContext {
    pub api: Arc<dyn ShelterApi>,
    pub identity: Arc<dyn IdentityProvider>,
    pub cache: QueryCache,
    pub notifier: Notifier,
    pub session: Session,
}

// =============================================================================
// MOUNT TRACKING
// =============================================================================

/// Whether a screen is still on screen. Clones share the flag.
#[derive(Debug, Clone)]
pub struct Mount(Arc<AtomicBool>);

impl Mount {
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn unmount(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Mount {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ScreenError {
    #[error("validation failed: {0}")]
    Invalid(ValidationErrors),

    #[error("invalid credentials form: {0}")]
    Credentials(CredentialErrors),

    #[error("a request is already in progress")]
    Busy,

    #[error("shelter id not provided")]
    MissingId,

    #[error("shelter {0} not found")]
    NotFound(u64),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
