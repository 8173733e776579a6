use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

/// A signed-in admin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Common trait for credential checkers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity>;

    fn provider_name(&self) -> &'static str;
}

pub const DEMO_EMAIL: &str = "admin@example.com";
pub const DEMO_PASSWORD: &str = "password123";

/// Fixed demo credentials, used when no identity backend is configured
pub struct DemoAuthProvider;

#[async_trait]
impl AuthProvider for DemoAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        if email == DEMO_EMAIL && password == DEMO_PASSWORD {
            info!("Demo login successful");
            return Ok(Identity {
                uid: "demo-user-id".to_string(),
                email: DEMO_EMAIL.to_string(),
                display_name: Some("Demo Admin".to_string()),
            });
        }
        warn!("Rejected demo login for {}", email);
        anyhow::bail!(
            "Invalid credentials. For demo use: {} / {}",
            DEMO_EMAIL,
            DEMO_PASSWORD
        )
    }

    fn provider_name(&self) -> &'static str {
        "demo"
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: String,
    display_name: Option<String>,
}

/// Email/password sign-in against the Firebase identity REST API
pub struct FirebaseAuthProvider {
    client: Client,
    api_key: String,
}

impl FirebaseAuthProvider {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl AuthProvider for FirebaseAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        let response = self
            .client
            .post("https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword")
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true
            }))
            .send()
            .await
            .context("Failed to reach identity service")?;

        if !response.status().is_success() {
            anyhow::bail!("Sign-in rejected: {}", response.status());
        }

        let body: SignInResponse = response
            .json()
            .await
            .context("Failed to parse sign-in response")?;

        Ok(Identity {
            uid: body.local_id,
            email: body.email,
            display_name: body.display_name.filter(|n| !n.is_empty()),
        })
    }

    fn provider_name(&self) -> &'static str {
        "firebase"
    }
}
