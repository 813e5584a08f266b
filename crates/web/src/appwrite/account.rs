//! Account and avatar services.

use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use super::{Account, AppwriteClient, AppwriteError, Auth, Session, segment};

impl AppwriteClient {
    /// The account that owns `session_secret`.
    ///
    /// # Errors
    ///
    /// Returns [`AppwriteError::Unauthorized`] when the session is missing,
    /// expired, or revoked.
    #[instrument(skip_all)]
    pub async fn get_account(&self, session_secret: &str) -> Result<Account, AppwriteError> {
        let url = self.url("/account")?;
        self.execute(self.request(Method::GET, url, Auth::Session(session_secret)))
            .await
    }

    /// Exchange the one-time `userId`/`secret` pair from an OAuth2 token
    /// callback for a session.
    ///
    /// Called with the API key so the response carries the session secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid, expired, or already used.
    #[instrument(skip(self, secret))]
    pub async fn create_session(&self, user_id: &str, secret: &str) -> Result<Session, AppwriteError> {
        let url = self.url("/account/sessions/token")?;
        let body = json!({ "userId": user_id, "secret": secret });

        self.execute(self.request(Method::POST, url, Auth::ApiKey).json(&body))
            .await
    }

    /// Delete the session identified by `session_secret`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn delete_current_session(&self, session_secret: &str) -> Result<(), AppwriteError> {
        let url = self.url("/account/sessions/current")?;
        self.send(self.request(Method::DELETE, url, Auth::Session(session_secret)))
            .await
            .map(|_| ())
    }

    /// URL that starts an OAuth2 token flow with `provider`.
    ///
    /// After consent Appwrite redirects to `success` with `userId` and
    /// `secret` query parameters, or to `failure`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint does not form a valid URL.
    pub fn oauth2_token_url(
        &self,
        provider: &str,
        success: &str,
        failure: &str,
    ) -> Result<String, AppwriteError> {
        let mut url = self.url(&format!("/account/tokens/oauth2/{}", segment(provider)))?;
        url.query_pairs_mut()
            .append_pair("project", self.project_id())
            .append_pair("success", success)
            .append_pair("failure", failure);
        Ok(url.into())
    }

    /// Initials avatar image URL for `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint does not form a valid URL.
    pub fn avatar_initials_url(&self, name: &str) -> Result<String, AppwriteError> {
        let mut url = self.url("/avatars/initials")?;
        url.query_pairs_mut()
            .append_pair("name", name)
            .append_pair("project", self.project_id());
        Ok(url.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::appwrite::test_support;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_account_sends_session_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/account"))
            .and(header("X-Appwrite-Session", "sess-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "$id": "acc-1",
                "name": "Jo Smith",
                "email": "jo@gym.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AppwriteClient::new(&test_support::config(&server.uri())).unwrap();
        let account = client.get_account("sess-secret").await.unwrap();
        assert_eq!(account.id, "acc-1");
        assert_eq!(account.email, "jo@gym.com");
    }

    #[tokio::test]
    async fn test_create_session_posts_token_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/account/sessions/token"))
            .and(header("X-Appwrite-Key", test_support::API_KEY))
            .and(body_json(json!({"userId": "u1", "secret": "s1"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "$id": "sess-1",
                "userId": "u1",
                "secret": "session-secret",
                "expire": "2026-01-01T00:00:00.000+00:00"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AppwriteClient::new(&test_support::config(&server.uri())).unwrap();
        let session = client.create_session("u1", "s1").await.unwrap();
        assert_eq!(session.user_id, "u1");
        assert_eq!(session.secret, "session-secret");
    }

    #[tokio::test]
    async fn test_delete_current_session() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/account/sessions/current"))
            .and(header("X-Appwrite-Session", "sess-secret"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = AppwriteClient::new(&test_support::config(&server.uri())).unwrap();
        client.delete_current_session("sess-secret").await.unwrap();
    }

    #[test]
    fn test_oauth2_token_url() {
        let client =
            AppwriteClient::new(&test_support::config("https://cloud.example")).unwrap();
        let url = client
            .oauth2_token_url(
                "google",
                "https://gym.example/api/auth/callback",
                "https://gym.example/?auth_error=user_cancelled",
            )
            .unwrap();

        assert!(url.starts_with("https://cloud.example/v1/account/tokens/oauth2/google?project=gymnet"));
        assert!(url.contains("success=https%3A%2F%2Fgym.example%2Fapi%2Fauth%2Fcallback"));
        assert!(url.contains("failure=https%3A%2F%2Fgym.example%2F%3Fauth_error%3Duser_cancelled"));
    }

    #[test]
    fn test_avatar_initials_url() {
        let client =
            AppwriteClient::new(&test_support::config("https://cloud.example")).unwrap();
        assert_eq!(
            client.avatar_initials_url("Jo Smith").unwrap(),
            "https://cloud.example/v1/avatars/initials?name=Jo+Smith&project=gymnet"
        );
    }
}
