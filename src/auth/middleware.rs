use crate::auth::gate::{AuthGate, GateView};
use crate::auth::session::{AuthService, SESSION_COOKIE};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;

pub const LOGIN_PATH: &str = "/login";

/// Bearer token first, then the session cookie
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Gate for admin routes. Signed-in requests carry their `Identity` as an
/// extension; everyone else is sent to the login view.
pub async fn require_session(
    State(auth): State<Arc<AuthService>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = session_token(req.headers());
    let state = auth.state_for(token.as_deref()).await;

    match AuthGate::new(LOGIN_PATH).on_state(&state) {
        GateView::Render(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        GateView::Redirect(path) => Redirect::to(&path).into_response(),
        GateView::Placeholder | GateView::Redirecting => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "loading" })),
        )
            .into_response(),
    }
}
