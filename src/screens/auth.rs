//! Welcome, login and signup screens.
//!
//! Form errors and provider failures stay on the form: field messages in
//! `errors`, the provider failure in `inline_error`. Neither raises a
//! blocking notice. A successful login or signup resets the stack to Home;
//! the alternate sign-in entry only replaces itself with Home.

use tracing::{info, warn};

use super::{ScreenContext, ScreenError};
use crate::editor::PendingFlag;
use crate::identity::{AuthUser, IdentityError};
use crate::router::{Route, Router};
use crate::validation::{self, CredentialErrors, CredentialField};

/// Inline text for a provider failure.
#[must_use]
pub fn describe_identity_error(err: &IdentityError) -> String {
    match err {
        IdentityError::Provider { code } => match code.as_str() {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => "E-mail ou senha inválidos".into(),
            "EMAIL_EXISTS" => "E-mail já cadastrado".into(),
            "USER_DISABLED" => "Conta desativada".into(),
            "TOO_MANY_ATTEMPTS_TRY_LATER" => "Muitas tentativas. Tente novamente mais tarde".into(),
            other => other.to_owned(),
        },
        other => other.to_string(),
    }
}

// =============================================================================
// WELCOME
// =============================================================================

/// Entry screen for signed-out users.
#[derive(Debug, Default)]
pub struct WelcomeScreen;

impl WelcomeScreen {
    pub fn proceed(&self, router: &mut Router) {
        router.push(Route::Login);
    }
}

// =============================================================================
// LOGIN
// =============================================================================

/// Where a successful sign-in lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Landing {
    /// Dismiss the stack down to Home.
    Reset,
    /// Swap the current entry for Home, keeping what is beneath it.
    Replace,
}

pub struct LoginScreen {
    ctx: ScreenContext,
    landing: Landing,
    email: String,
    password: String,
    errors: CredentialErrors,
    inline_error: Option<String>,
    pending: PendingFlag,
}

impl LoginScreen {
    #[must_use]
    pub fn new(ctx: ScreenContext) -> Self {
        Self {
            ctx,
            landing: Landing::Reset,
            email: String::new(),
            password: String::new(),
            errors: CredentialErrors::new(),
            inline_error: None,
            pending: PendingFlag::default(),
        }
    }

    /// The `signin` entry: same form, but success replaces only the current
    /// route with Home.
    #[must_use]
    pub fn sign_in(ctx: ScreenContext) -> Self {
        Self { landing: Landing::Replace, ..Self::new(ctx) }
    }

    pub fn set_email(&mut self, input: &str) {
        self.errors.remove(CredentialField::Email);
        self.email = input.to_owned();
    }

    pub fn set_password(&mut self, input: &str) {
        self.errors.remove(CredentialField::Password);
        self.password = input.to_owned();
    }

    #[must_use]
    pub fn errors(&self) -> &CredentialErrors {
        &self.errors
    }

    #[must_use]
    pub fn inline_error(&self) -> Option<&str> {
        self.inline_error.as_deref()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// Link to the signup form.
    pub fn open_signup(&self, router: &mut Router) {
        router.push(Route::Signup);
    }

    /// Validate and sign in.
    ///
    /// # Errors
    ///
    /// `Credentials` for form errors (no provider call), `Busy` while a
    /// sign-in is running, or the provider failure.
    pub async fn submit(&mut self, router: &mut Router) -> Result<AuthUser, ScreenError> {
        let Some(_guard) = self.pending.try_begin() else {
            return Err(ScreenError::Busy);
        };
        self.inline_error = None;

        if let Err(errors) = validation::validate_login(&self.email, &self.password) {
            self.errors = errors.clone();
            return Err(ScreenError::Credentials(errors));
        }
        self.errors.clear();

        match self.ctx.identity.sign_in(self.email.trim(), &self.password).await {
            Ok(user) => {
                info!(uid = %user.uid, "login succeeded");
                match self.landing {
                    Landing::Reset => router.reset(Route::Home),
                    Landing::Replace => router.replace(Route::Home),
                }
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "login failed");
                self.inline_error = Some(describe_identity_error(&e));
                Err(e.into())
            }
        }
    }
}

// =============================================================================
// SIGNUP
// =============================================================================

pub struct SignupScreen {
    ctx: ScreenContext,
    name: String,
    email: String,
    password: String,
    errors: CredentialErrors,
    inline_error: Option<String>,
    pending: PendingFlag,
}

impl SignupScreen {
    #[must_use]
    pub fn new(ctx: ScreenContext) -> Self {
        Self {
            ctx,
            name: String::new(),
            email: String::new(),
            password: String::new(),
            errors: CredentialErrors::new(),
            inline_error: None,
            pending: PendingFlag::default(),
        }
    }

    pub fn set_name(&mut self, input: &str) {
        self.errors.remove(CredentialField::Name);
        self.name = input.to_owned();
    }

    pub fn set_email(&mut self, input: &str) {
        self.errors.remove(CredentialField::Email);
        self.email = input.to_owned();
    }

    pub fn set_password(&mut self, input: &str) {
        self.errors.remove(CredentialField::Password);
        self.password = input.to_owned();
    }

    #[must_use]
    pub fn errors(&self) -> &CredentialErrors {
        &self.errors
    }

    #[must_use]
    pub fn inline_error(&self) -> Option<&str> {
        self.inline_error.as_deref()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// Link back to the login form.
    pub fn open_login(&self, router: &mut Router) {
        router.push(Route::Login);
    }

    /// Validate, create the account, then set its display name.
    ///
    /// # Errors
    ///
    /// As `LoginScreen::submit`.
    pub async fn submit(&mut self, router: &mut Router) -> Result<AuthUser, ScreenError> {
        let Some(_guard) = self.pending.try_begin() else {
            return Err(ScreenError::Busy);
        };
        self.inline_error = None;

        if let Err(errors) = validation::validate_signup(&self.name, &self.email, &self.password) {
            self.errors = errors.clone();
            return Err(ScreenError::Credentials(errors));
        }
        self.errors.clear();

        match self.register().await {
            Ok(user) => {
                info!(uid = %user.uid, "signup succeeded");
                router.reset(Route::Home);
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "signup failed");
                self.inline_error = Some(describe_identity_error(&e));
                Err(e.into())
            }
        }
    }

    async fn register(&self) -> Result<AuthUser, IdentityError> {
        self.ctx.identity.create_account(self.email.trim(), &self.password).await?;
        self.ctx.identity.update_display_name(self.name.trim()).await
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
