//! Process-wide configuration for the task tracker.
//!
//! Configuration is read once at startup from environment variables and then
//! shared read-only (behind an `Arc`) by every component.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//! - `GOOGLE_SHEETS_ID`: Target spreadsheet id
//! - `GOOGLE_SHEETS_CREDENTIALS`: Service-account JSON, inline or a file path
//!
//! Optional:
//! - `PORT`: HTTP port for the health and webhook server (default: 8000)
//! - `WEBHOOK_URL`: Public base URL; enables webhook mode
//! - `RAILWAY_PUBLIC_DOMAIN`: Used as `https://<domain>` when `WEBHOOK_URL` is unset
//! - `GOOGLE_SHEETS_WORKSHEET`: Worksheet (tab) name (default: Sheet1)

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable for the Telegram bot token.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Environment variable for the spreadsheet id.
pub const SHEET_ID_ENV: &str = "GOOGLE_SHEETS_ID";

/// Environment variable for the service-account credentials.
pub const CREDENTIALS_ENV: &str = "GOOGLE_SHEETS_CREDENTIALS";

/// Environment variable for the HTTP port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable for the public webhook base URL.
pub const WEBHOOK_URL_ENV: &str = "WEBHOOK_URL";

/// Public domain injected by Railway deployments.
pub const RAILWAY_DOMAIN_ENV: &str = "RAILWAY_PUBLIC_DOMAIN";

/// Environment variable for the worksheet name.
pub const WORKSHEET_ENV: &str = "GOOGLE_SHEETS_WORKSHEET";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default worksheet name.
pub const DEFAULT_WORKSHEET: &str = "Sheet1";

/// Default OAuth2 token endpoint for service accounts.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Path Telegram posts webhook updates to.
pub const WEBHOOK_PATH: &str = "/webhook";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The parts of a Google service-account key needed for the JWT grant.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Service account identity, used as the JWT issuer.
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// Key id, sent as the JWT `kid` header when present.
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// OAuth2 token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Parse a service-account JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Immutable bot configuration.
#[derive(Clone)]
pub struct BotConfig {
    /// Telegram bot token.
    pub bot_token: String,
    /// Spreadsheet id.
    pub sheet_id: String,
    /// Service-account credentials for the Sheets API.
    pub credentials: ServiceAccountKey,
    /// HTTP port for health checks and webhooks.
    pub port: u16,
    /// Public base URL; `Some` enables webhook mode.
    pub webhook_url: Option<String>,
    /// Worksheet (tab) rows are appended to.
    pub worksheet: String,
}

impl BotConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bot_token = get(BOT_TOKEN_ENV).ok_or(ConfigError::Missing(BOT_TOKEN_ENV))?;
        let sheet_id = get(SHEET_ID_ENV).ok_or(ConfigError::Missing(SHEET_ID_ENV))?;
        let raw_credentials = get(CREDENTIALS_ENV).ok_or(ConfigError::Missing(CREDENTIALS_ENV))?;
        let credentials = load_credentials(&raw_credentials)?;

        let port = match get(PORT_ENV) {
            Some(p) => p.parse().map_err(|_| ConfigError::Invalid {
                var: PORT_ENV,
                reason: format!("'{}' is not a valid port", p),
            })?,
            None => DEFAULT_PORT,
        };

        let webhook_url = match (get(WEBHOOK_URL_ENV), get(RAILWAY_DOMAIN_ENV)) {
            (Some(url), _) => Some(validate_url(WEBHOOK_URL_ENV, &url)?),
            (None, Some(domain)) => {
                Some(validate_url(RAILWAY_DOMAIN_ENV, &format!("https://{}", domain))?)
            }
            (None, None) => None,
        };

        let worksheet = get(WORKSHEET_ENV).unwrap_or_else(|| DEFAULT_WORKSHEET.to_string());

        Ok(Self {
            bot_token,
            sheet_id,
            credentials,
            port,
            webhook_url,
            worksheet,
        })
    }

    /// Full URL Telegram should post updates to, if webhook mode is enabled.
    pub fn webhook_endpoint(&self) -> Option<String> {
        self.webhook_url
            .as_ref()
            .map(|base| format!("{}{}", base.trim_end_matches('/'), WEBHOOK_PATH))
    }

    /// Sheet id shortened for display.
    pub fn sheet_id_preview(&self) -> String {
        if self.sheet_id.chars().count() > 20 {
            format!("{}...", self.sheet_id.chars().take(20).collect::<String>())
        } else {
            self.sheet_id.clone()
        }
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"<redacted>")
            .field("sheet_id", &self.sheet_id)
            .field("credentials", &self.credentials)
            .field("port", &self.port)
            .field("webhook_url", &self.webhook_url)
            .field("worksheet", &self.worksheet)
            .finish()
    }
}

/// Parse credentials given inline as JSON or as a path to a JSON file.
fn load_credentials(value: &str) -> Result<ServiceAccountKey, ConfigError> {
    let json = if value.starts_with('{') {
        value.to_string()
    } else {
        let path = Path::new(value);
        std::fs::read_to_string(path).map_err(|e| ConfigError::Invalid {
            var: CREDENTIALS_ENV,
            reason: format!("not inline JSON and cannot read {}: {}", path.display(), e),
        })?
    };

    ServiceAccountKey::from_json(&json).map_err(|e| ConfigError::Invalid {
        var: CREDENTIALS_ENV,
        reason: format!("not a service account key: {}", e),
    })
}

fn validate_url(var: &'static str, value: &str) -> Result<String, ConfigError> {
    let url = url::Url::parse(value).map_err(|e| ConfigError::Invalid {
        var,
        reason: format!("'{}' is not a URL: {}", value, e),
    })?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::Invalid {
            var,
            reason: format!("'{}' must be an http(s) URL", value),
        });
    }
    Ok(value.to_string())
}
