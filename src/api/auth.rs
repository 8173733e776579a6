use crate::api::AppState;
use crate::auth::{session_token, AuthState, SESSION_COOKIE};
use crate::error::ApiError;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/session", get(session))
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .auth
        .sign_in(&req.email, &req.password)
        .await
        .map_err(|e| {
            warn!("Sign-in failed for {}: {:#}", req.email, e);
            ApiError::Unauthorized
        })?;

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, session.token
    );
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(json!({ "token": session.token, "identity": session.identity })),
    ))
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let signed_out = match session_token(&headers) {
        Some(token) => state.auth.sign_out(&token).await,
        None => false,
    };
    let cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE);
    (
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(json!({ "signedOut": signed_out })),
    )
}

async fn session(State(state): State<AppState>, headers: HeaderMap) -> Json<AuthState> {
    let token = session_token(&headers);
    Json(state.auth.state_for(token.as_deref()).await)
}
