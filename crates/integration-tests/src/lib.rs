//! Integration tests for Gym Network.
//!
//! Drives the full axum router in-process against a `wiremock` stand-in for
//! the Appwrite REST API. No network services or credentials are needed.
//!
//! ```bash
//! cargo test -p gymnet-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gymnet_web::config::{AppConfig, AppwriteConfig};
use gymnet_web::state::AppState;

/// Users collection path on the mock server.
pub const USERS: &str = "/v1/databases/main/collections/users/documents";

/// Likes collection path on the mock server.
pub const LIKES: &str = "/v1/databases/main/collections/likes/documents";

/// Public base URL the app is configured with.
pub const BASE_URL: &str = "http://localhost:3000";

/// A router wired to a fresh mock Appwrite.
pub struct TestContext {
    pub appwrite: MockServer,
    pub app: Router,
}

impl TestContext {
    pub async fn new() -> Self {
        let appwrite = MockServer::start().await;
        let config = AppConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: BASE_URL.parse().unwrap(),
            appwrite: AppwriteConfig {
                endpoint: format!("{}/v1", appwrite.uri()),
                project_id: "gymnet".to_string(),
                database_id: "main".to_string(),
                user_collection_id: "users".to_string(),
                likes_collection_id: "likes".to_string(),
                bucket_id: Some("images".to_string()),
                api_key: SecretString::from("9f2c4e71b08ad3365e1f7c92ab40d85e"),
                timeout: Duration::from_secs(5),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };
        let app = gymnet_web::app(AppState::new(config).unwrap());

        Self { appwrite, app }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// `GET path`, optionally with a session cookie.
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Mount the Appwrite calls behind a successful sign-in of account `u1`
    /// owning `profile`, and return the session cookie.
    pub async fn sign_in(&self, profile: Value) -> String {
        Mock::given(method("POST"))
            .and(path("/v1/account/sessions/token"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "$id": "sess",
                "userId": "u1",
                "secret": "hosted-secret"
            })))
            .mount(&self.appwrite)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/account"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "$id": "u1",
                "name": "Jo Smith",
                "email": "jo@gym.com"
            })))
            .mount(&self.appwrite)
            .await;
        Mock::given(method("GET"))
            .and(path(USERS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 1,
                "documents": [profile]
            })))
            .mount(&self.appwrite)
            .await;

        let response = self
            .get("/api/auth/callback?userId=u1&secret=s1", None)
            .await;
        assert_eq!(location(&response), "/?auth_success=true");
        session_cookie(&response).expect("callback sets a session cookie")
    }
}

/// A stored profile document.
#[must_use]
pub fn profile_doc(id: &str, name: &str, description: &str) -> Value {
    json!({
        "$id": id,
        "$createdAt": "2024-05-01T10:00:00.000+00:00",
        "accountId": format!("acc-{id}"),
        "email": format!("{id}@gym.com"),
        "name": name,
        "username": id,
        "businessDescription": description,
        "contactDetails": "{\"phone\":\"555-1234\"}",
        "socialLinks": "",
        "workImages": "[]",
        "gymLocations": "[\"Gym A\",\"Gym B\"]"
    })
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response<Body>) -> String {
    assert!(
        response.status().is_redirection(),
        "expected redirect, got {}",
        response.status()
    );
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}

/// `name=value` of the session cookie set on a response.
#[must_use]
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("gymnet_session="))
        .and_then(|v| v.split(';').next())
        .map(String::from)
}

/// Read a response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Assert a status and return the body.
pub async fn expect_status(response: Response<Body>, status: StatusCode) -> String {
    assert_eq!(response.status(), status);
    body_text(response).await
}
