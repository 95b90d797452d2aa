//! Email/password identity over the Identity Toolkit REST API.
//!
//! Thin wrapper for `accounts:signInWithPassword`, `accounts:signUp`,
//! `accounts:update` and `accounts:lookup`. Tokens live in memory only;
//! sign-out drops them locally. A fresh provider has no session, so it
//! reports `SignedOut` immediately.
//!
//! Pure parsing lives in free functions for testability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{AuthBroadcaster, AuthSubscription, AuthUser, IdentityError, IdentityProvider, Session};
use crate::config::IdentityConfig;

#[derive(Debug, Clone)]
struct Tokens {
    id_token: String,
}

pub struct FirebaseIdentity {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    tokens: Mutex<Option<Tokens>>,
    broadcaster: AuthBroadcaster,
}

impl FirebaseIdentity {
    /// Build a provider from `config`.
    ///
    /// # Errors
    ///
    /// `MissingApiKey` without a key, `Request` if the HTTP client fails to
    /// build.
    pub fn new(config: IdentityConfig) -> Result<Self, IdentityError> {
        let api_key = config.api_key.ok_or(IdentityError::MissingApiKey)?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let broadcaster = AuthBroadcaster::new();
        broadcaster.publish(Session::SignedOut);

        Ok(Self { http, endpoint: config.endpoint, api_key, tokens: Mutex::new(None), broadcaster })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/accounts:{method}?key={}", self.endpoint, self.api_key)
    }

    async fn call<B: Serialize + Sync, T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, IdentityError> {
        let response = self
            .http
            .post(self.url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| IdentityError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(parse_error(status.as_u16(), &text));
        }
        serde_json::from_str(&text).map_err(|e| IdentityError::Request(format!("{method} response: {e}")))
    }

    /// Exchange credentials for tokens, store them, fill in account metadata
    /// and publish the signed-in session.
    async fn establish(&self, method: &str, email: &str, password: &str) -> Result<AuthUser, IdentityError> {
        let body = PasswordRequest { email, password, return_secure_token: true };
        let auth: AuthResponse = self.call(method, &body).await?;

        *self.tokens.lock().await = Some(Tokens { id_token: auth.id_token.clone() });

        let user = match self.lookup(&auth.id_token).await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "account lookup failed; using sign-in payload");
                user_from_auth(&auth)
            }
        };

        info!(uid = %user.uid, method, "signed in");
        self.broadcaster.publish(Session::SignedIn(user.clone()));
        Ok(user)
    }

    async fn lookup(&self, id_token: &str) -> Result<AuthUser, IdentityError> {
        let response: LookupResponse = self.call("lookup", &TokenRequest { id_token }).await?;
        response
            .users
            .into_iter()
            .next()
            .map(user_from_lookup)
            .ok_or(IdentityError::NotSignedIn)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, IdentityError> {
        self.establish("signInWithPassword", email, password).await
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser, IdentityError> {
        self.establish("signUp", email, password).await
    }

    async fn update_display_name(&self, name: &str) -> Result<AuthUser, IdentityError> {
        let id_token = self.tokens.lock().await.as_ref().map(|t| t.id_token.clone()).ok_or(IdentityError::NotSignedIn)?;

        let body = UpdateRequest { id_token: &id_token, display_name: name, return_secure_token: false };
        let _: serde_json::Value = self.call("update", &body).await?;

        let mut user = self.broadcaster.current_user().ok_or(IdentityError::NotSignedIn)?;
        user.display_name = Some(name.to_owned());
        self.broadcaster.publish(Session::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.tokens.lock().await.take();
        info!("signed out");
        self.broadcaster.publish(Session::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> AuthSubscription {
        self.broadcaster.subscribe()
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    id_token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    /// Milliseconds since the epoch, as a string.
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_error(status: u16, body: &str) -> IdentityError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            // Codes may carry a suffix: "WEAK_PASSWORD : Password should be ..."
            let code = envelope.error.message.split(" : ").next().unwrap_or_default().trim().to_owned();
            IdentityError::Provider { code }
        }
        Err(_) => IdentityError::Request(format!("status {status}")),
    }
}

fn user_from_auth(auth: &AuthResponse) -> AuthUser {
    AuthUser {
        uid: auth.local_id.clone(),
        email: auth.email.clone(),
        display_name: auth.display_name.clone().filter(|n| !n.is_empty()),
        created_at: None,
    }
}

fn user_from_lookup(user: LookupUser) -> AuthUser {
    AuthUser {
        uid: user.local_id,
        email: user.email,
        display_name: user.display_name.filter(|n| !n.is_empty()),
        created_at: user.created_at.as_deref().and_then(parse_millis),
    }
}

fn parse_millis(raw: &str) -> Option<DateTime<Utc>> {
    raw.trim().parse::<i64>().ok().and_then(DateTime::from_timestamp_millis)
}

#[cfg(test)]
#[path = "firebase_test.rs"]
mod tests;
