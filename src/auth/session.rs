use crate::auth::gate::AuthState;
use crate::auth::provider::{AuthProvider, Identity};
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

/// How long a session token stays valid after sign-in
pub const SESSION_TTL_HOURS: i64 = 12;

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub identity: Identity,
}

struct SessionEntry {
    identity: Identity,
    issued_at: DateTime<Utc>,
}

/// Signs admins in and out and publishes the session signal.
///
/// The signal starts in `Loading` until `start` has run, then tracks the
/// most recent sign-in or the last sign-out. Tokens expire `ttl` after
/// sign-in; expired ones are dropped on the next sign-in or lookup.
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
    sessions: RwLock<HashMap<String, SessionEntry>>,
    signal: watch::Sender<AuthState>,
    ttl: Duration,
}

impl AuthService {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self::with_ttl(provider, Duration::hours(SESSION_TTL_HOURS))
    }

    pub fn with_ttl(provider: Arc<dyn AuthProvider>, ttl: Duration) -> Self {
        let (signal, _) = watch::channel(AuthState::Loading);
        Self {
            provider,
            sessions: RwLock::new(HashMap::new()),
            signal,
            ttl,
        }
    }

    fn expired(&self, entry: &SessionEntry, now: DateTime<Utc>) -> bool {
        now - entry.issued_at >= self.ttl
    }

    /// Drop expired sessions; publishes `Unauthenticated` when none remain
    fn prune(&self, sessions: &mut HashMap<String, SessionEntry>) {
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, entry| !self.expired(entry, now));
        let dropped = before - sessions.len();
        if dropped > 0 {
            debug!("Expired {} session(s)", dropped);
            if sessions.is_empty() {
                self.signal.send_replace(AuthState::Unauthenticated);
            }
        }
    }

    pub async fn active_sessions(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions);
        sessions.len()
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Finish session restoration. Sessions are process-local, so there is
    /// nothing to restore and the signal settles immediately.
    pub async fn start(&self) {
        let current = self
            .sessions
            .read()
            .await
            .values()
            .max_by_key(|entry| entry.issued_at)
            .map(|entry| entry.identity.clone());
        self.signal.send_replace(match current {
            Some(identity) => AuthState::Authenticated(identity),
            None => AuthState::Unauthenticated,
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.signal.subscribe()
    }

    pub fn current(&self) -> AuthState {
        self.signal.borrow().clone()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let identity = self.provider.sign_in(email.trim(), password).await?;
        let token = Uuid::new_v4().to_string();

        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions);
        sessions.insert(
            token.clone(),
            SessionEntry {
                identity: identity.clone(),
                issued_at: Utc::now(),
            },
        );
        drop(sessions);
        self.signal
            .send_replace(AuthState::Authenticated(identity.clone()));
        info!("Signed in {} via {}", identity.email, self.provider_name());

        Ok(Session { token, identity })
    }

    /// Returns false for unknown tokens
    pub async fn sign_out(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(entry) = sessions.remove(token) else {
            return false;
        };
        info!("Signed out {}", entry.identity.email);
        if sessions.is_empty() {
            self.signal.send_replace(AuthState::Unauthenticated);
        }
        true
    }

    /// Session state for a single request
    pub async fn state_for(&self, token: Option<&str>) -> AuthState {
        if matches!(self.current(), AuthState::Loading) {
            return AuthState::Loading;
        }
        let Some(token) = token else {
            return AuthState::Unauthenticated;
        };
        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions);
        match sessions.get(token) {
            Some(entry) => AuthState::Authenticated(entry.identity.clone()),
            None => AuthState::Unauthenticated,
        }
    }
}
