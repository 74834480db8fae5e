//! Google ID token verification through the tokeninfo endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};

use crate::errors::{AppError, AppResult};

const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Identity asserted by a verified Google ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    /// Stable Google account id (`sub`)
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
}

#[async_trait]
pub trait GoogleVerifier: Send + Sync {
    async fn verify_id_token(&self, id_token: &str) -> AppResult<GoogleIdentity>;
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    iss: Option<String>,
    sub: String,
    email: Option<String>,
    #[serde(default, deserialize_with = "bool_or_string")]
    email_verified: bool,
    name: Option<String>,
}

/// tokeninfo encodes booleans as strings ("true"); accept both forms.
fn bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Text(text) => text.eq_ignore_ascii_case("true"),
    })
}

impl TokenInfo {
    fn into_identity(self, client_id: &str) -> AppResult<GoogleIdentity> {
        if self.aud != client_id {
            tracing::warn!(aud = %self.aud, "Google token issued for another client");
            return Err(AppError::InvalidCredentials);
        }

        if let Some(iss) = self.iss.as_deref() {
            if !GOOGLE_ISSUERS.contains(&iss) {
                return Err(AppError::InvalidCredentials);
            }
        }

        let email = match self.email {
            Some(email) if self.email_verified => email,
            _ => return Err(AppError::bad_request("Google account email is not verified")),
        };

        Ok(GoogleIdentity {
            subject: self.sub,
            email,
            name: self.name.filter(|n| !n.trim().is_empty()),
        })
    }
}

/// Verifies ID tokens against Google's tokeninfo endpoint.
#[derive(Debug, Clone)]
pub struct GoogleIdentityClient {
    http: Client,
    tokeninfo_url: String,
    client_id: Option<String>,
}

impl GoogleIdentityClient {
    pub fn new(http: Client, tokeninfo_url: impl Into<String>, client_id: Option<String>) -> Self {
        Self {
            http,
            tokeninfo_url: tokeninfo_url.into(),
            client_id,
        }
    }
}

#[async_trait]
impl GoogleVerifier for GoogleIdentityClient {
    async fn verify_id_token(&self, id_token: &str) -> AppResult<GoogleIdentity> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or_else(|| AppError::bad_request("Google sign-in is not configured"))?;

        let response = self
            .http
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Google tokeninfo request failed: {}", e)))?;

        let status = response.status();
        if status.is_client_error() {
            // Google answers 400 for malformed or expired tokens
            return Err(AppError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(AppError::upstream(format!("Google tokeninfo returned {}", status)));
        }

        let info: TokenInfo = response.json().await.map_err(|e| {
            AppError::upstream(format!("Google tokeninfo sent an unreadable response: {}", e))
        })?;

        info.into_identity(client_id)
    }
}
