//! Authentication routes: signup, login, token refresh and session control.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{AppState, error::ApiResult, extractors::ClientMeta, middleware::auth::AuthUser};
use million_core::auth::{
    AuthEventKind, hash_password, normalize_username, validate_password_policy, verify_password,
};
use million_db::{
    entities::{auth_events, auth_sessions, users},
    repositories::{
        AuthEventRepository, IssuedSession, NewAuthEvent, SessionError, SessionRepository,
        UserRepository,
    },
};
use million_shared::{
    AppError,
    auth::{
        AuthResponse, ChangePasswordRequest, LoginRequest, MeResponse, RefreshRequest,
        SignupRequest,
    },
    types::LimitQuery,
};

/// Routes reachable without a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

/// Routes that need a valid access token.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
        .route("/auth/logout-all", post(logout_all))
        .route("/auth/sessions", get(list_sessions))
        .route("/auth/sessions/{id}/revoke", post(revoke_session))
        .route("/auth/events", get(list_events))
        .route("/auth/change-password", post(change_password))
}

/// One open session.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Session ID.
    pub id: Uuid,
    /// Opened at.
    pub created_at: DateTime<Utc>,
    /// Last refresh.
    pub last_used_at: DateTime<Utc>,
    /// Refresh deadline.
    pub expires_at: DateTime<Utc>,
    /// Remote address at login or last refresh.
    pub ip_address: Option<String>,
    /// User agent at login or last refresh.
    pub user_agent: Option<String>,
    /// True for the session of the calling token.
    pub is_current: bool,
}

impl SessionResponse {
    fn from_model(session: auth_sessions::Model, current: Uuid) -> Self {
        Self {
            is_current: session.id == current,
            id: session.id,
            created_at: session.created_at.with_timezone(&Utc),
            last_used_at: session.last_used_at.with_timezone(&Utc),
            expires_at: session.expires_at.with_timezone(&Utc),
            ip_address: session.ip_address,
            user_agent: session.user_agent,
        }
    }
}

/// One audit trail event.
#[derive(Debug, Serialize)]
pub struct AuthEventResponse {
    /// Event ID.
    pub id: Uuid,
    /// Event kind, e.g. `login`.
    pub event_type: String,
    /// Outcome.
    pub success: bool,
    /// Session involved.
    pub session_id: Option<Uuid>,
    /// Remote address.
    pub ip_address: Option<String>,
    /// User agent.
    pub user_agent: Option<String>,
    /// Failure reason or other detail.
    pub detail: Option<String>,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}

impl From<auth_events::Model> for AuthEventResponse {
    fn from(event: auth_events::Model) -> Self {
        Self {
            id: event.id,
            event_type: event.event_type,
            success: event.success,
            session_id: event.session_id,
            ip_address: event.ip_address,
            user_agent: event.user_agent,
            detail: event.detail,
            created_at: event.created_at.with_timezone(&Utc),
        }
    }
}

fn event(kind: AuthEventKind, success: bool, client: &ClientMeta) -> NewAuthEvent {
    NewAuthEvent {
        ip_address: client.info().ip_address.clone(),
        user_agent: client.info().user_agent.clone(),
        ..NewAuthEvent::new(kind, success)
    }
}

fn token_pair(
    state: &AppState,
    user: &users::Model,
    issued: IssuedSession,
) -> ApiResult<AuthResponse> {
    let access_token =
        state
            .jwt_service
            .generate_access_token(user.id, issued.session.id, &user.username)?;

    Ok(AuthResponse {
        access_token,
        refresh_token: issued.refresh_token,
        token_type: "bearer".to_string(),
        expires_in: state.jwt_service.access_token_expires_in(),
        user_id: user.id,
        username: user.username.clone(),
    })
}

/// POST /auth/signup - Create a user and open a first session.
async fn signup(
    State(state): State<AppState>,
    client: ClientMeta,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    let username = normalize_username(&payload.username)
        .map_err(|msg| AppError::Validation(msg.to_string()))?;
    validate_password_policy(&payload.password)?;

    let user_repo = UserRepository::new((*state.db).clone());
    if user_repo.find_by_username(&username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".into()).into());
    }

    let password_hash = hash_password(&payload.password)?;
    let user = user_repo
        .create(&username, &password_hash)
        .await
        .map_err(|e| match e.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Username already taken".into())
            }
            _ => AppError::Database(e.to_string()),
        })?;

    let issued = SessionRepository::new((*state.db).clone())
        .create(user.id, state.jwt_service.refresh_token_ttl(), client.info())
        .await?;

    AuthEventRepository::new((*state.db).clone())
        .record(NewAuthEvent {
            user_id: Some(user.id),
            username: Some(user.username.clone()),
            session_id: Some(issued.session.id),
            ..event(AuthEventKind::Signup, true, &client)
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, "User signed up");

    Ok((StatusCode::CREATED, Json(token_pair(&state, &user, issued)?)))
}

/// POST /auth/login - Authenticate and return a token pair.
///
/// Failed attempts are recorded per username+ip; once the throttle limit is
/// reached inside the window, further attempts get 429 without a password
/// check.
async fn login(
    State(state): State<AppState>,
    client: ClientMeta,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let username = payload.username.trim().to_string();
    let events = AuthEventRepository::new((*state.db).clone());

    let failures = events
        .count_recent_failures(&username, client.ip(), state.throttle.window_start(Utc::now()))
        .await?;
    if state.throttle.is_limited(failures) {
        warn!(username = %username, ip = ?client.ip(), failures, "Login throttled");
        events
            .record(NewAuthEvent {
                username: Some(username),
                detail: Some("rate_limited".into()),
                ..event(AuthEventKind::Login, false, &client)
            })
            .await?;
        return Err(
            AppError::RateLimited("Too many failed login attempts, try again later".into()).into(),
        );
    }

    let user = UserRepository::new((*state.db).clone())
        .find_by_username(&username)
        .await?;

    let verified = match &user {
        Some(user) => verify_password(&payload.password, &user.password_hash)?,
        None => false,
    };

    let Some(user) = user.filter(|_| verified) else {
        info!(username = %username, "Failed login attempt");
        events
            .record(NewAuthEvent {
                username: Some(username),
                detail: Some("invalid_credentials".into()),
                ..event(AuthEventKind::Login, false, &client)
            })
            .await?;
        return Err(AppError::Unauthorized("Invalid username or password".into()).into());
    };

    let issued = SessionRepository::new((*state.db).clone())
        .create(user.id, state.jwt_service.refresh_token_ttl(), client.info())
        .await?;

    events
        .record(NewAuthEvent {
            user_id: Some(user.id),
            username: Some(user.username.clone()),
            session_id: Some(issued.session.id),
            ..event(AuthEventKind::Login, true, &client)
        })
        .await?;

    info!(user_id = %user.id, session_id = %issued.session.id, "User logged in");

    Ok(Json(token_pair(&state, &user, issued)?))
}

/// POST /auth/refresh - Rotate a refresh token.
async fn refresh(
    State(state): State<AppState>,
    client: ClientMeta,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let events = AuthEventRepository::new((*state.db).clone());

    let issued = match SessionRepository::new((*state.db).clone())
        .rotate(
            &payload.refresh_token,
            state.jwt_service.refresh_token_ttl(),
            client.info(),
        )
        .await
    {
        Ok(issued) => issued,
        Err(SessionError::Database(e)) => return Err(e.into()),
        Err(e) => {
            let session_id = match &e {
                SessionError::Reused { session_id } => Some(*session_id),
                _ => None,
            };
            events
                .record(NewAuthEvent {
                    session_id,
                    detail: Some(e.to_string()),
                    ..event(AuthEventKind::Refresh, false, &client)
                })
                .await?;
            return Err(e.into());
        }
    };

    let user = UserRepository::new((*state.db).clone())
        .find_by_id(issued.session.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))?;

    events
        .record(NewAuthEvent {
            user_id: Some(user.id),
            username: Some(user.username.clone()),
            session_id: Some(issued.session.id),
            ..event(AuthEventKind::Refresh, true, &client)
        })
        .await?;

    info!(user_id = %user.id, session_id = %issued.session.id, "Refresh token rotated");

    Ok(Json(token_pair(&state, &user, issued)?))
}

/// GET /auth/me - The authenticated user.
async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<MeResponse>> {
    let user = UserRepository::new((*state.db).clone())
        .find_by_id(auth.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(MeResponse {
        user_id: user.id,
        username: user.username,
    }))
}

/// POST /auth/logout - Revoke the current session.
async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientMeta,
) -> ApiResult<impl IntoResponse> {
    let revoked = SessionRepository::new((*state.db).clone())
        .revoke(auth.user_id(), auth.session_id(), "logout")
        .await?;

    AuthEventRepository::new((*state.db).clone())
        .record(NewAuthEvent {
            user_id: Some(auth.user_id()),
            username: Some(auth.username().to_string()),
            session_id: Some(auth.session_id()),
            ..event(AuthEventKind::Logout, true, &client)
        })
        .await?;

    info!(user_id = %auth.user_id(), session_id = %auth.session_id(), "User logged out");

    Ok(Json(json!({ "revoked": revoked })))
}

/// POST /auth/logout-all - Revoke every session and every access token
/// issued so far.
async fn logout_all(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientMeta,
) -> ApiResult<impl IntoResponse> {
    let revoked = SessionRepository::new((*state.db).clone())
        .logout_all(auth.user_id(), Utc::now())
        .await?;

    AuthEventRepository::new((*state.db).clone())
        .record(NewAuthEvent {
            user_id: Some(auth.user_id()),
            username: Some(auth.username().to_string()),
            session_id: Some(auth.session_id()),
            detail: Some(format!("{revoked} sessions revoked")),
            ..event(AuthEventKind::LogoutAll, true, &client)
        })
        .await?;

    info!(user_id = %auth.user_id(), revoked, "Global logout");

    Ok(Json(json!({ "revoked_sessions": revoked })))
}

/// GET /auth/sessions - Open sessions, marking the caller's.
async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<SessionResponse>>> {
    let sessions = SessionRepository::new((*state.db).clone())
        .list_active(auth.user_id())
        .await?;

    Ok(Json(
        sessions
            .into_iter()
            .map(|s| SessionResponse::from_model(s, auth.session_id()))
            .collect(),
    ))
}

/// POST /auth/sessions/{id}/revoke - Revoke one of the caller's sessions.
async fn revoke_session(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientMeta,
    Path(session_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let revoked = SessionRepository::new((*state.db).clone())
        .revoke(auth.user_id(), session_id, "revoked")
        .await?;
    if !revoked {
        return Err(AppError::NotFound(format!("Session not found: {session_id}")).into());
    }

    AuthEventRepository::new((*state.db).clone())
        .record(NewAuthEvent {
            user_id: Some(auth.user_id()),
            username: Some(auth.username().to_string()),
            session_id: Some(session_id),
            ..event(AuthEventKind::RevokeSession, true, &client)
        })
        .await?;

    info!(user_id = %auth.user_id(), session_id = %session_id, "Session revoked");

    Ok(Json(json!({ "revoked": true, "session_id": session_id })))
}

/// GET /auth/events - Recent auth events, newest first.
async fn list_events(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<AuthEventResponse>>> {
    let events = AuthEventRepository::new((*state.db).clone())
        .list_for_user(auth.user_id(), query.clamped(50, 200))
        .await?;

    Ok(Json(events.into_iter().map(Into::into).collect()))
}

/// POST /auth/change-password - Replace the password and log out everywhere.
async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientMeta,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = UserRepository::new((*state.db).clone())
        .find_by_id(auth.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let events = AuthEventRepository::new((*state.db).clone());

    if !verify_password(&payload.current_password, &user.password_hash)? {
        events
            .record(NewAuthEvent {
                user_id: Some(user.id),
                username: Some(user.username.clone()),
                session_id: Some(auth.session_id()),
                detail: Some("invalid_current_password".into()),
                ..event(AuthEventKind::ChangePassword, false, &client)
            })
            .await?;
        return Err(AppError::Unauthorized("Current password is incorrect".into()).into());
    }

    validate_password_policy(&payload.new_password)?;
    let password_hash = hash_password(&payload.new_password)?;

    let revoked = SessionRepository::new((*state.db).clone())
        .change_password(user.id, &password_hash, Utc::now())
        .await?;

    events
        .record(NewAuthEvent {
            user_id: Some(user.id),
            username: Some(user.username.clone()),
            session_id: Some(auth.session_id()),
            ..event(AuthEventKind::ChangePassword, true, &client)
        })
        .await?;

    info!(user_id = %user.id, revoked, "Password changed");

    Ok(Json(json!({ "status": "password_changed", "revoked_sessions": revoked })))
}
