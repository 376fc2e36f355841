use log::info;
use reqwest::Method;
use validator::Validate;

use super::models::{AuthResponse, LoginRequest, RegisterRequest};
use super::{decode, ApiClient, ApiError, Result};
use crate::session::Credential;

impl ApiClient {
    /// Exchanges email and password for a credential. The caller decides
    /// whether to hand it to the session manager.
    pub async fn login(&self, email: &str, password: &str) -> Result<Credential> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "email and password are required".to_string(),
            ));
        }

        let body = LoginRequest {
            email: email.trim(),
            password,
        };
        let response = self
            .send_anonymous(Method::POST, "/auth/login", Some(&body))
            .await?;
        let response: AuthResponse = decode(&response)?;
        info!("✅ Logged in as user {}", response.id);
        Credential::try_from(response)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Credential> {
        request.validate()?;

        let response = self
            .send_anonymous(Method::POST, "/auth/register", Some(request))
            .await?;
        let response: AuthResponse = decode(&response)?;
        info!("✅ Registered user {}", response.id);
        Credential::try_from(response)
    }
}
