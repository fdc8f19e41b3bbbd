//! Service account authentication.
//!
//! Signs an RS256 assertion with the service account key and trades it at
//! the token endpoint for a bearer token. The token is cached and reused
//! until shortly before it expires.

use std::time::{Duration, Instant};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::wire::{error_message, TokenResponse};
use super::SheetsError;
use crate::config::SHEETS_SCOPE;

/// Lifetime requested for each signed assertion.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Claims of the assertion sent to the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl AssertionClaims {
    pub fn new(issuer: &str, token_uri: &str, issued_at: i64) -> Self {
        Self {
            iss: issuer.to_string(),
            scope: SHEETS_SCOPE.to_string(),
            aud: token_uri.to_string(),
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        }
    }
}

struct CachedToken {
    token: SecretString,
    refresh_at: Instant,
}

/// Issues bearer tokens for one service account.
pub struct TokenProvider {
    client_email: String,
    token_uri: String,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    /// Parse the PEM key up front so a bad key fails at startup.
    pub fn new(
        client_email: impl Into<String>,
        private_key: &SecretString,
        token_uri: impl Into<String>,
    ) -> Result<Self, SheetsError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key.expose_secret().as_bytes())
            .map_err(|e| SheetsError::Auth(format!("Invalid service account key: {}", e)))?;

        Ok(Self {
            client_email: client_email.into(),
            token_uri: token_uri.into(),
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    /// Sign a fresh assertion.
    pub fn sign_assertion(&self) -> Result<String, SheetsError> {
        let claims = AssertionClaims::new(
            &self.client_email,
            &self.token_uri,
            chrono::Utc::now().timestamp(),
        );
        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| SheetsError::Auth(format!("Failed to sign assertion: {}", e)))
    }

    /// A valid bearer token, fetching a new one when the cache is stale.
    ///
    /// The lock is held across the exchange so concurrent requests share
    /// one refresh.
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<SecretString, SheetsError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.exchange(http).await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    /// Drop the cached token, e.g. after the API answered 401.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn exchange(&self, http: &reqwest::Client) -> Result<CachedToken, SheetsError> {
        let assertion = self.sign_assertion()?;
        tracing::debug!(token_uri = %self.token_uri, "Requesting service account token");

        let response = http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SheetsError::Auth(format!(
                "Token exchange failed ({}): {}",
                status.as_u16(),
                error_message(&body)
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| SheetsError::Decode(format!("token response: {}", e)))?;
        let lifetime = Duration::from_secs(parsed.expires_in).saturating_sub(REFRESH_MARGIN);

        Ok(CachedToken {
            token: SecretString::from(parsed.access_token),
            refresh_at: Instant::now() + lifetime,
        })
    }
}
