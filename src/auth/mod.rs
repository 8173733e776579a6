pub mod gate;
pub mod middleware;
pub mod provider;
pub mod session;

pub use gate::{AuthGate, AuthState, GateView};
pub use middleware::{require_session, session_token, LOGIN_PATH};
pub use provider::{AuthProvider, DemoAuthProvider, FirebaseAuthProvider, Identity};
pub use session::{AuthService, Session, SESSION_COOKIE};
