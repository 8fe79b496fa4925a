//! OAuth2 access tokens for the Sheets API.
//!
//! Service accounts authenticate with the JWT bearer grant: a short-lived
//! RS256 assertion signed with the account's private key is exchanged at the
//! key's `token_uri` for an access token. Tokens are cached until shortly
//! before they expire.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::ServiceAccountKey;
use crate::error::{Result, SheetsError};

/// Scope granting read/write access to spreadsheets.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion (Google's maximum).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Source of bearer tokens for Google API calls.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a currently valid access token.
    async fn access_token(&self) -> Result<String>;
}

/// A fixed token, for tests and for tokens minted elsewhere.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wrap an existing access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// JWT claims for the service-account grant.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN < self.expires_at
    }
}

/// Access tokens minted from a service-account key.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// Create an authenticator. Fails if the private key is not a valid RSA PEM.
    pub fn new(key: ServiceAccountKey) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        Ok(Self {
            key,
            encoding_key,
            http: super::client::http_client(),
            cached: Mutex::new(None),
        })
    }

    /// Service account email the tokens are issued for.
    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Sign the grant assertion for a given issue time (unix seconds).
    fn build_assertion(&self, issued_at: i64) -> Result<String> {
        let claims = Claims {
            iss: self.key.client_email.clone(),
            scope: SHEETS_SCOPE.to_string(),
            aud: self.key.token_uri.clone(),
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        Ok(jsonwebtoken::encode(&header, &claims, &self.encoding_key)?)
    }

    async fn fetch_token(&self) -> Result<CachedToken> {
        let assertion = self.build_assertion(Utc::now().timestamp())?;

        debug!(token_uri = %self.key.token_uri, "Requesting access token");

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| SheetsError::Transport(format!("token endpoint unreachable: {}", e)))?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(desc) => format!("{}: {}", err.error, desc),
                    None => err.error,
                },
                Err(_) => body,
            };
            // Google answers a rejected grant with 400 invalid_grant
            return Err(match status.as_u16() {
                400 | 401 | 403 => SheetsError::Auth(message),
                code => SheetsError::from_status(code, message),
            });
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| SheetsError::Parse(format!("token response: {}", e)))?;

        info!(
            client_email = %self.key.client_email,
            expires_in = token.expires_in,
            "Obtained Google access token"
        );

        // Capped at the assertion lifetime
        let lifetime = token.expires_in.min(ASSERTION_LIFETIME_SECS as u64);
        Ok(CachedToken {
            token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        })
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(current) = cached.as_ref().filter(|c| c.is_fresh()) {
            return Ok(current.token.clone());
        }

        let fresh = self.fetch_token().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}
