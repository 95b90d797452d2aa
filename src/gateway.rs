//! Backend gateway — thin HTTP wrapper over the shelter REST API.
//!
//! DESIGN
//! ======
//! One `reqwest::Client` per gateway, built with a fixed timeout and JSON
//! default headers. Five operations map 1:1 onto endpoints. There is no
//! retry and no caching here; the query cache owns memoisation and
//! invalidation.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures, timeouts, non-2xx statuses and undecodable bodies are
//! all `GatewayError`. The variants exist for logs; callers treat any of
//! them as one generic failure.
//!
//! `ShelterApi` is the seam screens depend on, so tests can substitute an
//! in-memory backend.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::shelter::{Shelter, ShelterDraft};

const RESOURCE: &str = "shelters";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Connection or transport failure.
    #[error("request failed: {0}")]
    Request(String),

    /// No response within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Backend answered with a non-2xx status.
    #[error("backend returned status {status}")]
    Status { status: u16, body: String },

    /// Response body was not the expected JSON.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl GatewayError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() { GatewayError::Timeout } else { GatewayError::Request(err.to_string()) }
}

// =============================================================================
// API SEAM
// =============================================================================

/// The five shelter operations. Enables substituting the backend in tests.
#[async_trait::async_trait]
pub trait ShelterApi: Send + Sync {
    /// `GET /api/shelters`
    async fn list(&self) -> Result<Vec<Shelter>, GatewayError>;
    /// `GET /api/shelters/{id}`
    async fn get(&self, id: u64) -> Result<Shelter, GatewayError>;
    /// `POST /api/shelters`
    async fn create(&self, draft: &ShelterDraft) -> Result<Shelter, GatewayError>;
    /// `PUT /api/shelters/update/{id}`
    async fn update(&self, id: u64, draft: &ShelterDraft) -> Result<Shelter, GatewayError>;
    /// `DELETE /api/shelters/delete/{id}`
    async fn delete(&self, id: u64) -> Result<(), GatewayError>;
}

#[must_use]
pub fn collection_path() -> String {
    format!("/api/{RESOURCE}")
}

#[must_use]
pub fn item_path(id: u64) -> String {
    format!("/api/{RESOURCE}/{id}")
}

#[must_use]
pub fn update_path(id: u64) -> String {
    format!("/api/{RESOURCE}/update/{id}")
}

#[must_use]
pub fn delete_path(id: u64) -> String {
    format!("/api/{RESOURCE}/delete/{id}")
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpGateway {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpGateway {
    /// Build a gateway for `config`.
    ///
    /// # Errors
    ///
    /// Returns `ClientBuild` if the underlying client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayError::ClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    async fn send(&self, method: reqwest::Method, path: &str, body: Option<&ShelterDraft>) -> Result<String, GatewayError> {
        let url = self.config.url(path);
        debug!(%method, %url, "backend request");

        let request = self.http.request(method, &url);
        let request = match body {
            Some(draft) => request.json(draft),
            None => request,
        };

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(GatewayError::Status { status: status.as_u16(), body: text });
        }
        Ok(text)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&ShelterDraft>,
    ) -> Result<T, GatewayError> {
        let text = self.send(method, path, body).await?;
        parse_body(&text)
    }
}

fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, GatewayError> {
    serde_json::from_str(text).map_err(|e| GatewayError::Decode(e.to_string()))
}

#[async_trait::async_trait]
impl ShelterApi for HttpGateway {
    async fn list(&self) -> Result<Vec<Shelter>, GatewayError> {
        self.send_json(reqwest::Method::GET, &collection_path(), None).await
    }

    async fn get(&self, id: u64) -> Result<Shelter, GatewayError> {
        self.send_json(reqwest::Method::GET, &item_path(id), None).await
    }

    async fn create(&self, draft: &ShelterDraft) -> Result<Shelter, GatewayError> {
        self.send_json(reqwest::Method::POST, &collection_path(), Some(draft)).await
    }

    async fn update(&self, id: u64, draft: &ShelterDraft) -> Result<Shelter, GatewayError> {
        self.send_json(reqwest::Method::PUT, &update_path(id), Some(draft)).await
    }

    async fn delete(&self, id: u64) -> Result<(), GatewayError> {
        self.send(reqwest::Method::DELETE, &delete_path(id), None).await.map(|_| ())
    }
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;
