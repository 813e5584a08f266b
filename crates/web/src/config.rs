//! Web front-end configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `APPWRITE_PROJECT_ID` - Appwrite project ID
//! - `APPWRITE_DATABASE_ID` - Database holding the profile and like collections
//! - `APPWRITE_USER_COLLECTION_ID` - Profile collection ID
//! - `APPWRITE_LIKES_COLLECTION_ID` - Like collection ID
//! - `APPWRITE_API_KEY` - Server API key (high entropy, not a placeholder)
//! - `GYMNET_BASE_URL` - Public URL of the site (OAuth redirects, share links)
//!
//! ## Optional
//! - `APPWRITE_ENDPOINT` - REST endpoint (default: <https://cloud.appwrite.io/v1>)
//! - `APPWRITE_BUCKET_ID` - Storage bucket for uploaded images. Uploads fail
//!   when this is unset; everything else keeps working.
//! - `APPWRITE_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `GYMNET_HOST` - Bind address (default: 127.0.0.1)
//! - `GYMNET_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_APPWRITE_ENDPOINT: &str = "https://cloud.appwrite.io/v1";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Web front-end configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the site
    pub base_url: Url,
    /// Hosted backend configuration
    pub appwrite: AppwriteConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Appwrite project configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AppwriteConfig {
    /// REST endpoint, without trailing slash (e.g. `https://cloud.appwrite.io/v1`)
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub user_collection_id: String,
    pub likes_collection_id: String,
    /// Storage bucket for profile and work images
    pub bucket_id: Option<String>,
    /// Server API key (document and storage access)
    pub api_key: SecretString,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for AppwriteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppwriteConfig")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("database_id", &self.database_id)
            .field("user_collection_id", &self.user_collection_id)
            .field("likes_collection_id", &self.likes_collection_id)
            .field("bucket_id", &self.bucket_id)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("GYMNET_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("GYMNET_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("GYMNET_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("GYMNET_PORT".to_string(), e.to_string()))?;
        let base_url = parse_url("GYMNET_BASE_URL", &get_required_env("GYMNET_BASE_URL")?)?;

        let appwrite = AppwriteConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            base_url,
            appwrite,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.scheme() == "https"
    }

    /// Absolute URL for a path on this site.
    #[must_use]
    pub fn absolute_url(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}{path}")
    }
}

impl AppwriteConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let endpoint = get_env_or_default("APPWRITE_ENDPOINT", DEFAULT_APPWRITE_ENDPOINT);
        parse_url("APPWRITE_ENDPOINT", &endpoint)?;

        let timeout_secs = get_env_or_default("APPWRITE_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("APPWRITE_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id: get_required_env("APPWRITE_PROJECT_ID")?,
            database_id: get_required_env("APPWRITE_DATABASE_ID")?,
            user_collection_id: get_required_env("APPWRITE_USER_COLLECTION_ID")?,
            likes_collection_id: get_required_env("APPWRITE_LIKES_COLLECTION_ID")?,
            bucket_id: get_optional_env("APPWRITE_BUCKET_ID"),
            api_key: get_validated_secret("APPWRITE_API_KEY")?,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an absolute `http`/`https` URL.
fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Appwrite API keys are long random hex strings
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key generated in the Appwrite console."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn appwrite_config() -> AppwriteConfig {
        AppwriteConfig {
            endpoint: "https://cloud.appwrite.io/v1".to_string(),
            project_id: "gymnet".to_string(),
            database_id: "main".to_string(),
            user_collection_id: "users".to_string(),
            likes_collection_id: "likes".to_string(),
            bucket_id: None,
            api_key: SecretString::from("super_sensitive_api_key_value"),
            timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "APPWRITE_API_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaa", "APPWRITE_API_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_hex_key() {
        let result = validate_secret_strength(
            "9f2c4e71b08ad3365e1f7c92ab40d85e6f1b3c7a2d9e04f8",
            "APPWRITE_API_KEY",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_url_rejects_non_http() {
        assert!(parse_url("GYMNET_BASE_URL", "https://gym.example").is_ok());
        assert!(parse_url("GYMNET_BASE_URL", "ftp://gym.example").is_err());
        assert!(parse_url("GYMNET_BASE_URL", "gym.example").is_err());
    }

    #[test]
    fn test_socket_addr_and_urls() {
        let config = AppConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: Url::parse("https://gym.example/").unwrap(),
            appwrite: appwrite_config(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(config.is_https());
        assert_eq!(
            config.absolute_url("/api/auth/callback"),
            "https://gym.example/api/auth/callback"
        );
    }

    #[test]
    fn test_appwrite_config_debug_redacts_api_key() {
        let debug_output = format!("{:?}", appwrite_config());

        assert!(debug_output.contains("gymnet"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_sensitive_api_key_value"));
    }
}
