//! Profile screen: account details and a confirmed sign-out.

use tracing::{info, warn};

use super::{ERROR_TITLE, Mount, ScreenContext, ScreenError};
use crate::identity::AuthUser;
use crate::router::{Route, Router};

pub const NAME_FALLBACK: &str = "Nome não informado";
pub const EMAIL_FALLBACK: &str = "E-mail não informado";
pub const DATE_FALLBACK: &str = "Data não disponível";
pub const NO_USER: &str = "Usuário não encontrado";

pub const SIGN_OUT_TITLE: &str = "Sair";
pub const SIGN_OUT_PROMPT: &str = "Tem certeza que deseja sair da sua conta?";
const SIGN_OUT_FAILED: &str = "Não foi possível sair da conta";

/// What the profile cards show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDetails {
    pub display_name: String,
    pub email: String,
    /// Account creation date as `dd/mm/yyyy`.
    pub member_since: String,
}

impl From<&AuthUser> for ProfileDetails {
    fn from(user: &AuthUser) -> Self {
        Self {
            display_name: user.display_name.clone().filter(|n| !n.trim().is_empty()).unwrap_or_else(|| NAME_FALLBACK.into()),
            email: user.email.clone().filter(|e| !e.trim().is_empty()).unwrap_or_else(|| EMAIL_FALLBACK.into()),
            member_since: user.created_at.map_or_else(|| DATE_FALLBACK.into(), |t| t.format("%d/%m/%Y").to_string()),
        }
    }
}

pub struct ProfileScreen {
    ctx: ScreenContext,
    confirming: bool,
    mount: Mount,
}

impl ProfileScreen {
    #[must_use]
    pub fn new(ctx: ScreenContext) -> Self {
        Self { ctx, confirming: false, mount: Mount::new() }
    }

    /// `None` when nobody is signed in; the screen then shows `NO_USER`.
    #[must_use]
    pub fn details(&self) -> Option<ProfileDetails> {
        self.ctx.session.user().map(ProfileDetails::from)
    }

    #[must_use]
    pub fn is_confirming(&self) -> bool {
        self.confirming
    }

    #[must_use]
    pub fn mount(&self) -> Mount {
        self.mount.clone()
    }

    pub fn back(&self, router: &mut Router) {
        router.back();
    }

    /// Open the confirmation prompt. Returns its title and message.
    pub fn request_sign_out(&mut self) -> (&'static str, &'static str) {
        self.confirming = true;
        (SIGN_OUT_TITLE, SIGN_OUT_PROMPT)
    }

    pub fn cancel_sign_out(&mut self) {
        self.confirming = false;
    }

    /// Sign out if the prompt is open. Returns whether a sign-out happened.
    /// Success replaces the current route with Login.
    ///
    /// # Errors
    ///
    /// The provider failure, after raising a notice.
    pub async fn confirm_sign_out(&mut self, router: &mut Router) -> Result<bool, ScreenError> {
        if !self.confirming {
            return Ok(false);
        }
        self.confirming = false;

        match self.ctx.identity.sign_out().await {
            Ok(()) => {
                info!(user_id = self.ctx.session.user_id(), "signed out from profile");
                if self.mount.is_mounted() {
                    router.replace(Route::Login);
                }
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "sign-out failed");
                if self.mount.is_mounted() {
                    self.ctx.notifier.error(ERROR_TITLE, SIGN_OUT_FAILED);
                }
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
