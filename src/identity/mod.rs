//! Identity — sign-in state from an external provider.
//!
//! ARCHITECTURE
//! ============
//! Providers publish auth state on a `tokio::sync::watch` channel. The
//! channel starts in `AuthPhase::Unknown`; the first notification moves it
//! to a known `Session`. The `IdentityGate` holds a subscription and lets
//! the app wait for that first notification before anything is built, so
//! "unknown" is never a visible state.
//!
//! Dropping the gate (or any `AuthSubscription`) unsubscribes.

pub mod firebase;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

pub use firebase::FirebaseIdentity;

// =============================================================================
// TYPES
// =============================================================================

/// User descriptor handed out by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Known sign-in state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    SignedOut,
    SignedIn(AuthUser),
}

impl Session {
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user().map(|u| u.uid.as_str())
    }

    #[must_use]
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Self::SignedIn(user) => Some(user),
            Self::SignedOut => None,
        }
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.user().and_then(|u| u.email.as_deref())
    }
}

/// Value carried on the auth channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPhase {
    /// No notification received yet.
    Unknown,
    Known(Session),
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The provider rejected the call (wrong password, email taken, ...).
    #[error("identity provider rejected the request: {code}")]
    Provider { code: String },

    #[error("identity request failed: {0}")]
    Request(String),

    #[error("no user is signed in")]
    NotSignedIn,

    #[error("identity provider API key is not configured")]
    MissingApiKey,

    /// The provider went away before publishing a state.
    #[error("identity provider closed its auth channel")]
    GateClosed,
}

// =============================================================================
// PROVIDER SEAM
// =============================================================================

/// Email/password identity provider. Enables substituting the provider in
/// tests.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, IdentityError>;

    async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser, IdentityError>;

    /// Set the signed-in user's display name.
    async fn update_display_name(&self, name: &str) -> Result<AuthUser, IdentityError>;

    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// Subscribe to auth-state notifications.
    fn subscribe(&self) -> AuthSubscription;
}

// =============================================================================
// CHANNEL
// =============================================================================

/// Publishing side of the auth channel, embedded in providers.
#[derive(Debug)]
pub struct AuthBroadcaster {
    tx: watch::Sender<AuthPhase>,
}

impl AuthBroadcaster {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthPhase::Unknown);
        Self { tx }
    }

    pub fn publish(&self, session: Session) {
        self.tx.send_replace(AuthPhase::Known(session));
    }

    #[must_use]
    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription { rx: self.tx.subscribe() }
    }

    #[must_use]
    pub fn current_user(&self) -> Option<AuthUser> {
        match &*self.tx.borrow() {
            AuthPhase::Known(Session::SignedIn(user)) => Some(user.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for AuthBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of the auth channel.
#[derive(Debug)]
pub struct AuthSubscription {
    rx: watch::Receiver<AuthPhase>,
}

impl AuthSubscription {
    #[must_use]
    pub fn current(&self) -> AuthPhase {
        self.rx.borrow().clone()
    }

    /// Wait until the phase is known and return that session.
    ///
    /// # Errors
    ///
    /// `GateClosed` if the provider is dropped while still unknown.
    pub async fn known(&mut self) -> Result<Session, IdentityError> {
        let phase = self
            .rx
            .wait_for(|phase| matches!(phase, AuthPhase::Known(_)))
            .await
            .map_err(|_| IdentityError::GateClosed)?;
        match &*phase {
            AuthPhase::Known(session) => Ok(session.clone()),
            AuthPhase::Unknown => Err(IdentityError::GateClosed),
        }
    }

    /// Wait for the next notification after the last one observed.
    ///
    /// # Errors
    ///
    /// `GateClosed` if the provider is dropped.
    pub async fn changed(&mut self) -> Result<Session, IdentityError> {
        loop {
            self.rx.changed().await.map_err(|_| IdentityError::GateClosed)?;
            if let AuthPhase::Known(session) = &*self.rx.borrow_and_update() {
                return Ok(session.clone());
            }
        }
    }
}

// =============================================================================
// GATE
// =============================================================================

/// Holds the app back until the first auth notification, then tracks the
/// current session.
#[derive(Debug)]
pub struct IdentityGate {
    subscription: AuthSubscription,
    session: Option<Session>,
}

impl IdentityGate {
    #[must_use]
    pub fn new(provider: &dyn IdentityProvider) -> Self {
        Self { subscription: provider.subscribe(), session: None }
    }

    /// Resolve once the provider has reported a state.
    ///
    /// # Errors
    ///
    /// `GateClosed` if the provider disappears first.
    pub async fn ready(&mut self) -> Result<Session, IdentityError> {
        if let Some(session) = &self.session {
            return Ok(session.clone());
        }
        let session = self.subscription.known().await?;
        tracing::info!(signed_in = session.is_signed_in(), user_id = session.user_id(), "identity gate open");
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Wait for the next sign-in/sign-out notification.
    ///
    /// # Errors
    ///
    /// `GateClosed` if the provider disappears.
    pub async fn next_change(&mut self) -> Result<Session, IdentityError> {
        let session = self.subscription.changed().await?;
        tracing::info!(signed_in = session.is_signed_in(), user_id = session.user_id(), "session changed");
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Current session; `None` until `ready` resolves.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
