//! Top-level composition.
//!
//! `App::boot` holds everything back until the identity provider has
//! reported its first state, then builds the shared context and picks the
//! initial route: Home for a signed-in user, Welcome otherwise. Session
//! changes after boot update the context handed to screens built later;
//! screens already built keep the session they were created with.

use std::sync::Arc;

use tracing::info;

use crate::cache::QueryCache;
use crate::gateway::ShelterApi;
use crate::identity::{IdentityError, IdentityGate, IdentityProvider, Session};
use crate::notice::Notifier;
use crate::router::{Route, Router};
use crate::screens::{
    CreateShelterScreen, EditShelterScreen, LoginScreen, Menu, ProfileScreen, ScreenContext, ScreenError,
    ShelterDirectory, SignupScreen, WelcomeScreen,
};

pub struct App {
    api: Arc<dyn ShelterApi>,
    identity: Arc<dyn IdentityProvider>,
    cache: QueryCache,
    notifier: Notifier,
    gate: IdentityGate,
    session: Session,
    router: Router,
}

impl App {
    /// Wait for the first auth notification and build the app.
    ///
    /// # Errors
    ///
    /// `GateClosed` if the provider goes away before reporting a state.
    pub async fn boot(
        api: Arc<dyn ShelterApi>,
        identity: Arc<dyn IdentityProvider>,
        notifier: Notifier,
    ) -> Result<Self, IdentityError> {
        let mut gate = IdentityGate::new(identity.as_ref());
        let session = gate.ready().await?;
        let initial = initial_route(&session);
        info!(route = %initial, "app ready");

        Ok(Self { api, identity, cache: QueryCache::new(), notifier, gate, session, router: Router::new(initial) })
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Wait for the next sign-in/sign-out and adopt it.
    ///
    /// # Errors
    ///
    /// `GateClosed` if the provider goes away.
    pub async fn next_session_change(&mut self) -> Result<&Session, IdentityError> {
        self.session = self.gate.next_change().await?;
        Ok(&self.session)
    }

    /// Context for a screen built now.
    #[must_use]
    pub fn context(&self) -> ScreenContext {
        ScreenContext {
            api: Arc::clone(&self.api),
            identity: Arc::clone(&self.identity),
            cache: self.cache.clone(),
            notifier: self.notifier.clone(),
            session: self.session.clone(),
        }
    }

    // -------------------------------------------------------------------------
    // Screen factories
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn welcome(&self) -> WelcomeScreen {
        WelcomeScreen
    }

    #[must_use]
    pub fn menu(&self) -> Menu {
        Menu
    }

    #[must_use]
    pub fn login(&self) -> LoginScreen {
        LoginScreen::new(self.context())
    }

    /// Screen for the `signin` route.
    #[must_use]
    pub fn sign_in(&self) -> LoginScreen {
        LoginScreen::sign_in(self.context())
    }

    #[must_use]
    pub fn signup(&self) -> SignupScreen {
        SignupScreen::new(self.context())
    }

    #[must_use]
    pub fn directory(&self) -> ShelterDirectory {
        ShelterDirectory::new(self.context())
    }

    #[must_use]
    pub fn create_shelter(&self) -> CreateShelterScreen {
        CreateShelterScreen::new(self.context())
    }

    /// # Errors
    ///
    /// `MissingId` when the route carried no usable id.
    pub fn edit_shelter(&self, id: Option<u64>) -> Result<EditShelterScreen, ScreenError> {
        EditShelterScreen::open(self.context(), id)
    }

    #[must_use]
    pub fn profile(&self) -> ProfileScreen {
        ProfileScreen::new(self.context())
    }
}

fn initial_route(session: &Session) -> Route {
    if session.is_signed_in() { Route::Home } else { Route::Welcome }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
