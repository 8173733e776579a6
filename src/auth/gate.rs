use crate::auth::provider::Identity;
use serde::Serialize;
use tokio::sync::watch;

/// Session signal as seen by protected views
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "identity", rename_all = "camelCase")]
pub enum AuthState {
    Loading,
    Authenticated(Identity),
    Unauthenticated,
}

/// What a protected view should do right now
#[derive(Debug, Clone, PartialEq)]
pub enum GateView {
    /// Still resolving; show a placeholder and do nothing else
    Placeholder,
    /// Go to the login view. Issued once per unauthenticated episode.
    Redirect(String),
    /// Already redirected; keep showing the placeholder
    Redirecting,
    Render(Identity),
}

/// Guards admin views. Never prompts for credentials itself; it only reacts
/// to the session signal.
#[derive(Debug, Clone)]
pub struct AuthGate {
    login_path: String,
    redirected: bool,
}

impl AuthGate {
    pub fn new(login_path: &str) -> Self {
        Self {
            login_path: login_path.to_string(),
            redirected: false,
        }
    }

    pub fn on_state(&mut self, state: &AuthState) -> GateView {
        match state {
            AuthState::Loading => GateView::Placeholder,
            AuthState::Authenticated(identity) => {
                self.redirected = false;
                GateView::Render(identity.clone())
            }
            AuthState::Unauthenticated if self.redirected => GateView::Redirecting,
            AuthState::Unauthenticated => {
                self.redirected = true;
                GateView::Redirect(self.login_path.clone())
            }
        }
    }

    /// Wait for the signal to leave `Loading`, then decide
    pub async fn resolve(&mut self, rx: &mut watch::Receiver<AuthState>) -> GateView {
        let state = match rx.wait_for(|s| *s != AuthState::Loading).await {
            Ok(state) => state.clone(),
            // Sender gone while loading: nobody can ever sign in
            Err(_) => AuthState::Unauthenticated,
        };
        self.on_state(&state)
    }
}
