pub mod admin;
pub mod analytics;
pub mod auth;
pub mod interviews;
pub mod models;
pub mod questions;

pub use interviews::NextQuestion;
pub use models::*;

use std::time::Duration;

use log::{debug, error, warn};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::session::SessionManager;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Not signed in or session expired ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Could not reach backend: {0}")]
    Transport(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Maps a non-success response to an error, keeping the backend's message.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = backend_message(body).unwrap_or_else(|| {
            StatusCode::from_u16(status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .unwrap_or("request failed")
                .to_string()
        });

        match status {
            401 | 403 => ApiError::Unauthorized { status, message },
            404 => ApiError::NotFound { message },
            _ => ApiError::Status { status, message },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status, .. } | ApiError::Status { status, .. } => Some(*status),
            ApiError::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Failures the user may simply re-initiate.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

/// Pulls a readable message out of an error body. The backend answers with
/// plain `Error: ...` text, but JSON shapes are accepted as well.
fn backend_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let text = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(serde_json::Value::Object(map)) => {
            match ["message", "error"]
                .iter()
                .find_map(|key| map.get(*key).and_then(|v| v.as_str()))
            {
                Some(msg) => msg.to_string(),
                None => body.to_string(),
            }
        }
        _ => body.to_string(),
    };

    let text = text.strip_prefix("Error:").unwrap_or(text.as_str()).trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// The single outbound channel to the backend.
///
/// Every call reads the credential from the [`SessionManager`] at send time
/// and attaches it as a bearer token when present. Calls are never retried
/// and nothing is cached.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionManager,
}

impl ApiClient {
    pub fn new(base_url: &str, session: SessionManager) -> Result<Self> {
        Self::with_timeout(base_url, session, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: &str, session: SessionManager, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn from_config(config: &ClientConfig, session: SessionManager) -> Result<Self> {
        Self::with_timeout(
            &config.api_base_url,
            session,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.send(Method::GET, path, None::<&()>).await?;
        decode(&body)
    }

    pub(crate) async fn send_json<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.send(method, path, body).await?;
        decode(&body)
    }

    /// One round trip. Returns the raw success body.
    pub(crate) async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        self.dispatch(method, path, body, true).await
    }

    /// Like [`send`](Self::send) but never attaches the bearer token.
    pub(crate) async fn send_anonymous<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        self.dispatch(method, path, body, false).await
    }

    async fn dispatch<B>(&self, method: Method, path: &str, body: Option<&B>, authorize: bool) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let credential = if authorize { self.session.credential() } else { None };

        let mut request = self.client.request(method.clone(), &url);
        if let Some(credential) = &credential {
            request = request.header(AUTHORIZATION, format!("Bearer {}", credential.token()));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!("🌐 {} {}", method, path);
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(text);
        }

        let err = ApiError::from_status(status.as_u16(), &text);
        warn!("⚠️ {} {} failed: {}", method, path, err);

        if let (true, Some(sent)) = (err.is_unauthorized(), credential) {
            match self.session.clear_rejected(sent.token()) {
                Ok(true) => warn!("🔒 Credential rejected by backend, signed out"),
                Ok(false) => debug!("🔒 Rejected credential already replaced"),
                Err(e) => error!("❌ Failed to clear rejected credential: {}", e),
            }
        }

        Err(err)
    }
}
