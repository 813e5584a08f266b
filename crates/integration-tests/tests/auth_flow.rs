//! OAuth callback, sign-in state, and sign-out through the full router.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use gymnet_integration_tests::{
    BASE_URL, TestContext, body_text, expect_status, location, profile_doc, session_cookie,
};

#[tokio::test]
async fn test_callback_success_redirects_with_success_flag() {
    let ctx = TestContext::new().await;
    let cookie = ctx.sign_in(profile_doc("p1", "Jo Smith", "Coach")).await;
    assert!(cookie.starts_with("gymnet_session="));
}

#[tokio::test]
async fn test_callback_without_secret_reports_missing_params() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/v1/account/sessions/token"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&ctx.appwrite)
        .await;

    let response = ctx.get("/api/auth/callback?userId=u1", None).await;

    assert_eq!(location(&response), "/?auth_error=missing_params");
}

#[tokio::test]
async fn test_callback_exchange_failure_carries_message() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/v1/account/sessions/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Invalid token passed in the request.",
            "code": 401,
            "type": "user_invalid_token"
        })))
        .mount(&ctx.appwrite)
        .await;

    let response = ctx
        .get("/api/auth/callback?userId=u1&secret=expired", None)
        .await;

    assert_eq!(
        location(&response),
        "/?auth_error=Invalid%20token%20passed%20in%20the%20request."
    );
}

#[tokio::test]
async fn test_error_banner_is_rendered() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 0,
            "documents": []
        })))
        .mount(&ctx.appwrite)
        .await;

    let body = expect_status(
        ctx.get("/?auth_error=missing_params", None).await,
        StatusCode::OK,
    )
    .await;

    assert!(body.contains("the provider did not return credentials"));
    assert!(body.contains("Sign in with Google"));
}

#[tokio::test]
async fn test_login_redirects_to_provider() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/auth/login", None).await;
    let target = url::Url::parse(&location(&response)).unwrap();

    assert_eq!(target.path(), "/v1/account/tokens/oauth2/google");
    let pairs: Vec<(String, String)> = target.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("project".to_string(), "gymnet".to_string())));
    assert!(pairs.contains(&(
        "success".to_string(),
        format!("{BASE_URL}/api/auth/callback")
    )));
    assert!(pairs.contains(&(
        "failure".to_string(),
        format!("{BASE_URL}/?auth_error=user_cancelled")
    )));
}

#[tokio::test]
async fn test_signed_in_member_can_open_editor() {
    let ctx = TestContext::new().await;
    let cookie = ctx.sign_in(profile_doc("p1", "Jo Smith", "Coach")).await;

    let body = expect_status(
        ctx.get("/profile/edit", Some(&cookie)).await,
        StatusCode::OK,
    )
    .await;

    assert!(body.contains("value=\"Jo Smith\""));
    assert!(body.contains("value=\"Gym A, Gym B\""));
    assert!(body.contains("value=\"555-1234\""));
}

#[tokio::test]
async fn test_sign_out_is_best_effort() {
    let ctx = TestContext::new().await;
    let cookie = ctx.sign_in(profile_doc("p1", "Jo Smith", "Coach")).await;
    Mock::given(method("DELETE"))
        .and(path("/v1/account/sessions/current"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&ctx.appwrite)
        .await;

    let response = ctx
        .send(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(location(&response), "/");

    // The session no longer carries a hosted secret
    let response = ctx.get("/profile/edit", Some(&cookie)).await;
    assert_eq!(location(&response), "/auth/login");
}

#[tokio::test]
async fn test_editor_requires_sign_in() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/profile/edit", None).await;

    assert_eq!(location(&response), "/auth/login");
    assert!(session_cookie(&response).is_none());
}

#[tokio::test]
async fn test_htmx_like_without_session_is_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(
            Request::builder()
                .method("POST")
                .uri("/profile/p2/like")
                .header("hx-request", "true")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["hx-redirect"], "/auth/login");
    assert!(body_text(response).await.is_empty());
}

#[tokio::test]
async fn test_logout_only_accepts_post() {
    let ctx = TestContext::new().await;
    let cookie = ctx.sign_in(profile_doc("p1", "Jo Smith", "Coach")).await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&ctx.appwrite)
        .await;

    let response = ctx.get("/auth/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    // Still signed in
    expect_status(ctx.get("/profile/edit", Some(&cookie)).await, StatusCode::OK).await;
}
