mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{PASSWORD, TestApp, access, refresh_token};
use million_core::auth::LoginThrottle;
use million_db::UserRepository;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;
    let (status, body) = app.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn signup_then_login_and_me() {
    let app = TestApp::new().await;
    let tokens = app.signup("alice").await;
    assert_eq!(tokens["token_type"], "bearer");
    assert_eq!(tokens["username"], "alice");
    assert_eq!(tokens["expires_in"], 900);

    let (status, login) = app.login("alice", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["user_id"], tokens["user_id"]);

    let (status, me) = app.get("/auth/me", access(&login)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
    assert_eq!(me["user_id"], tokens["user_id"]);
}

#[tokio::test]
async fn signup_rejects_weak_password_and_duplicates() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(
            "POST",
            "/auth/signup",
            None,
            Some(json!({ "username": "bob", "password": "short" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    app.signup("bob").await;
    let (status, body) = app
        .request(
            "POST",
            "/auth/signup",
            None,
            Some(json!({ "username": "bob", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = TestApp::new().await;

    let (status, body) = app.request("GET", "/cash/balance", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = app.get("/auth/me", "not.a.token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    app.signup("carol").await;

    let (status, body) = app.login("carol", "WrongPassword123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid username or password");

    let (status, _) = app.login("nobody", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_rotates_and_reuse_revokes_session() {
    let app = TestApp::new().await;
    let first = app.signup("dave").await;

    let (status, second) = app.refresh(refresh_token(&first)).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(refresh_token(&second), refresh_token(&first));

    let (status, _) = app.get("/auth/me", access(&second)).await;
    assert_eq!(status, StatusCode::OK);

    // Replaying the consumed token kills the whole session.
    let (status, _) = app.refresh(refresh_token(&first)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.refresh(refresh_token(&second)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/auth/me", access(&second)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_refresh_token_is_unauthorized() {
    let app = TestApp::new().await;
    let (status, body) = app.refresh("definitely-not-issued").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn logout_revokes_only_the_current_session() {
    let app = TestApp::new().await;
    let first = app.signup("erin").await;
    let (_, second) = app.login("erin", PASSWORD).await;

    let (status, body) = app.post("/auth/logout", access(&first), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revoked"], true);

    let (status, _) = app.get("/auth/me", access(&first)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.refresh(refresh_token(&first)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/auth/me", access(&second)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn logout_all_rejects_every_earlier_token() {
    let app = TestApp::new().await;
    let first = app.signup("frank").await;
    let (_, second) = app.login("frank", PASSWORD).await;

    let (status, body) = app.post("/auth/logout-all", access(&first), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revoked_sessions"], 2);

    for tokens in [&first, &second] {
        let (status, _) = app.get("/auth/me", access(tokens)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = app.refresh(refresh_token(tokens)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, fresh) = app.login("frank", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/auth/me", access(&fresh)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn sessions_list_marks_current_and_revoke_by_id() {
    let app = TestApp::new().await;
    let first = app.signup("grace").await;
    let (_, second) = app.login("grace", PASSWORD).await;

    let (status, sessions) = app.get("/auth/sessions", access(&first)).await;
    assert_eq!(status, StatusCode::OK);
    let sessions = sessions.as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(
        sessions.iter().filter(|s| s["is_current"] == true).count(),
        1
    );

    let other = sessions
        .iter()
        .find(|s| s["is_current"] == false)
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) = app
        .post(&format!("/auth/sessions/{other}/revoke"), access(&first), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/auth/me", access(&second)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Revoking again finds nothing.
    let (status, _) = app
        .post(&format!("/auth/sessions/{other}/revoke"), access(&first), json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_is_throttled_after_repeated_failures() {
    let app = TestApp::with_throttle(LoginThrottle::new(300, 3)).await;
    app.signup("heidi").await;

    for _ in 0..3 {
        let (status, _) = app.login("heidi", "WrongPassword123").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, body) = app.login("heidi", PASSWORD).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "RATE_LIMITED");
}

async fn wrong_login_from(app: &TestApp, username: &str, forwarded: &str) -> StatusCode {
    let (status, _) = app
        .request_with_headers(
            "POST",
            "/auth/login",
            None,
            &[("x-forwarded-for", forwarded)],
            Some(json!({ "username": username, "password": "WrongPassword123" })),
        )
        .await;
    status
}

#[tokio::test]
async fn spoofed_forwarded_for_does_not_reset_throttle() {
    let app = TestApp::with_throttle(LoginThrottle::new(300, 3)).await;
    app.signup("judy").await;

    let mut statuses = Vec::new();
    for i in 0..20 {
        statuses.push(wrong_login_from(&app, "judy", &format!("10.0.0.{i}")).await);
    }

    assert!(statuses[..3].iter().all(|s| *s == StatusCode::UNAUTHORIZED));
    assert!(statuses[3..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn trusted_proxy_headers_key_the_throttle_by_forwarded_ip() {
    let app = TestApp::with_state(|state| {
        state
            .with_throttle(LoginThrottle::new(300, 3))
            .with_trusted_proxy_headers(true)
    })
    .await;
    app.signup("ken").await;

    for _ in 0..3 {
        assert_eq!(
            wrong_login_from(&app, "ken", "203.0.113.7").await,
            StatusCode::UNAUTHORIZED
        );
    }
    assert_eq!(
        wrong_login_from(&app, "ken", "203.0.113.7").await,
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(
        wrong_login_from(&app, "ken", "198.51.100.2").await,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn auth_cutoff_rejects_earlier_tokens_on_open_sessions() {
    let app = TestApp::new().await;
    let tokens = app.signup("lena").await;

    let (status, me) = app.get("/auth/me", access(&tokens)).await;
    assert_eq!(status, StatusCode::OK);
    let user_id = Uuid::parse_str(me["user_id"].as_str().unwrap()).unwrap();

    UserRepository::bump_auth_valid_after(&app.db, user_id, Utc::now())
        .await
        .unwrap();

    let (status, body) = app.get("/auth/me", access(&tokens)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has been revoked");

    // The session itself was left open, so the refresh token still rotates.
    let (status, rotated) = app.refresh(refresh_token(&tokens)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, me) = app.get("/auth/me", access(&rotated)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "lena");
}

#[tokio::test]
async fn change_password_invalidates_old_tokens() {
    let app = TestApp::new().await;
    let tokens = app.signup("ivan").await;
    let new_password = "EvenBetter42Password";

    let (status, _) = app
        .post(
            "/auth/change-password",
            access(&tokens),
            json!({ "current_password": "WrongPassword123", "new_password": new_password }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post(
            "/auth/change-password",
            access(&tokens),
            json!({ "current_password": PASSWORD, "new_password": new_password }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revoked_sessions"], 1);

    let (status, _) = app.get("/auth/me", access(&tokens)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.login("ivan", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.login("ivan", new_password).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn auth_events_are_recorded_newest_first() {
    let app = TestApp::new().await;
    let tokens = app.signup("judy").await;
    app.login("judy", "WrongPassword123").await;
    let (_, login) = app.login("judy", PASSWORD).await;

    let (status, events) = app.get("/auth/events?limit=10", access(&login)).await;
    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<&str> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event_type"].as_str().unwrap())
        .collect();
    // The failed attempt has no user attached, so only the successes show.
    assert_eq!(kinds, vec!["login", "signup"]);

    let (status, events) = app.get("/auth/events?limit=1", access(&tokens)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events.as_array().unwrap().len(), 1);
}
