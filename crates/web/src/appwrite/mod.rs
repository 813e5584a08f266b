//! Appwrite REST API client.
//!
//! # Architecture
//!
//! - Plain REST over `reqwest`; no SDK
//! - Appwrite is the source of truth - NO local sync, direct API calls
//! - Document and storage calls authenticate with the server API key
//! - Account calls act on behalf of a member with their session secret
//!
//! # Services
//!
//! ## Databases
//! - List (with JSON queries), get, create, update, delete documents
//!
//! ## Storage
//! - Multipart file upload, public view URLs
//!
//! ## Account
//! - Current account lookup, token-to-session exchange, sign-out
//! - OAuth2 token redirect URL
//!
//! ## Avatars
//! - Initials avatar URL
//!
//! # Example
//!
//! ```rust,ignore
//! use gymnet_web::appwrite::{AppwriteClient, Query};
//!
//! let client = AppwriteClient::new(&config.appwrite)?;
//!
//! let page = client
//!     .list_documents("main", "users", &[Query::equal("accountId", "64f1c2"), Query::limit(1)])
//!     .await?;
//! ```

mod account;
mod databases;
pub mod query;
mod storage;
pub mod types;

pub use query::Query;
pub use types::*;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::AppwriteConfig;

/// Errors that can occur when calling the Appwrite REST API.
#[derive(Debug, Error)]
pub enum AppwriteError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Appwrite answered with an error body.
    #[error("Appwrite error {status} ({kind}): {message}")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint or path did not form a valid URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A document with the requested ID already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or invalid credentials (including "no session").
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by Appwrite.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// How a request authenticates.
#[derive(Debug, Clone, Copy)]
enum Auth<'a> {
    /// Server API key.
    ApiKey,
    /// A member's session secret.
    Session(&'a str),
}

// =============================================================================
// AppwriteClient
// =============================================================================

/// Client for the Appwrite REST API.
///
/// Cheaply cloneable; all clones share one connection pool.
#[derive(Clone)]
pub struct AppwriteClient {
    inner: Arc<AppwriteClientInner>,
}

struct AppwriteClientInner {
    client: reqwest::Client,
    endpoint: String,
    project_id: String,
    api_key: SecretString,
}

impl AppwriteClient {
    /// Create a new Appwrite client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &AppwriteConfig) -> Result<Self, AppwriteError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("gymnet-web/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(AppwriteClientInner {
                client,
                endpoint: config.endpoint.trim_end_matches('/').to_string(),
                project_id: config.project_id.clone(),
                api_key: config.api_key.clone(),
            }),
        })
    }

    /// REST endpoint, without trailing slash.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Appwrite project ID.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.inner.project_id
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request plumbing
    // ─────────────────────────────────────────────────────────────────────────

    /// Absolute URL for an API path such as `/account`.
    fn url(&self, path: &str) -> Result<Url, AppwriteError> {
        Ok(Url::parse(&format!("{}{path}", self.inner.endpoint))?)
    }

    fn request(&self, method: Method, url: Url, auth: Auth<'_>) -> RequestBuilder {
        let builder = self
            .inner
            .client
            .request(method, url)
            .header("X-Appwrite-Project", &self.inner.project_id);

        match auth {
            Auth::ApiKey => {
                builder.header("X-Appwrite-Key", self.inner.api_key.expose_secret())
            }
            Auth::Session(secret) => builder.header("X-Appwrite-Session", secret),
        }
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, AppwriteError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(AppwriteError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let error: ErrorBody = serde_json::from_str(&body).unwrap_or_else(|_| ErrorBody {
            message: body.chars().take(200).collect(),
            code: status.as_u16(),
            kind: String::new(),
        });

        match status {
            StatusCode::NOT_FOUND => {
                tracing::debug!(message = %error.message, "Appwrite resource not found");
                Err(AppwriteError::NotFound(error.message))
            }
            StatusCode::UNAUTHORIZED => {
                tracing::debug!(kind = %error.kind, "Appwrite request unauthorized");
                Err(AppwriteError::Unauthorized(error.message))
            }
            StatusCode::CONFLICT => {
                tracing::debug!(message = %error.message, "Appwrite document conflict");
                Err(AppwriteError::Conflict(error.message))
            }
            _ => {
                tracing::error!(
                    status = %status,
                    code = error.code,
                    body = %body.chars().take(500).collect::<String>(),
                    "Appwrite API returned non-success status"
                );
                Err(AppwriteError::Api {
                    status: status.as_u16(),
                    kind: error.kind,
                    message: error.message,
                })
            }
        }
    }

    /// Send a request and parse the JSON response.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppwriteError> {
        let body = self.send(request).await?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse Appwrite response"
            );
            AppwriteError::Parse(e)
        })
    }
}

/// Percent-encode one path segment.
fn segment(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_appwrite_error_display() {
        let err = AppwriteError::NotFound("Document not found".to_string());
        assert_eq!(err.to_string(), "Not found: Document not found");
    }

    #[tokio::test]
    async fn test_error_body_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/account"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "User (role: guests) missing scope (account)",
                "code": 401,
                "type": "general_unauthorized_scope"
            })))
            .mount(&server)
            .await;

        let client = AppwriteClient::new(&test_support::config(&server.uri())).unwrap();
        let err = client.get_account("expired").await.unwrap_err();
        assert!(matches!(err, AppwriteError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_server_error_keeps_type_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/databases/main/collections/users/documents/p1"))
            .and(header("X-Appwrite-Project", "gymnet"))
            .and(header("X-Appwrite-Key", test_support::API_KEY))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "message": "Server Error",
                "code": 500,
                "type": "general_unknown"
            })))
            .mount(&server)
            .await;

        let client = AppwriteClient::new(&test_support::config(&server.uri())).unwrap();
        let err = client.get_document("main", "users", "p1").await.unwrap_err();
        match err {
            AppwriteError::Api {
                status,
                kind,
                message,
            } => {
                assert_eq!(status, 500);
                assert_eq!(kind, "general_unknown");
                assert_eq!(message, "Server Error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_reads_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/account"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .mount(&server)
            .await;

        let client = AppwriteClient::new(&test_support::config(&server.uri())).unwrap();
        let err = client.get_account("secret").await.unwrap_err();
        assert!(matches!(err, AppwriteError::RateLimited(7)));
    }
}
