use crate::models::ContactSubmission;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SHEETS_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

pub const HEADER_ROW: [&str; 6] = ["Submitted At", "Name", "Email", "Phone", "Message", "Status"];

/// Common trait for spreadsheet sinks
#[async_trait]
pub trait SpreadsheetSink: Send + Sync {
    /// Append one row, creating the header row first when the sheet is blank.
    /// Returns the number of rows written.
    async fn append_row(&self, values: Vec<String>) -> Result<u64>;
}

/// Row layout matching [`HEADER_ROW`]
pub fn contact_row(submission: &ContactSubmission) -> Vec<String> {
    vec![
        submission
            .submitted_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string(),
        submission.name.clone(),
        submission.email.clone(),
        submission.phone.clone().unwrap_or_default(),
        submission.message.clone(),
        submission.status.clone(),
    ]
}

#[derive(Debug, Clone)]
pub struct ServiceAccount {
    pub client_email: String,
    /// PEM; literal `\n` sequences from env files are accepted
    pub private_key: String,
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: Option<SheetProperties>,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    updates: Option<AppendUpdates>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_rows: Option<u64>,
}

/// Google Sheets v4 sink authenticated as a service account
pub struct GoogleSheetsSink {
    client: Client,
    spreadsheet_id: String,
    account: ServiceAccount,
    token: Mutex<Option<(String, Instant)>>,
}

impl GoogleSheetsSink {
    pub fn new(spreadsheet_id: String, account: ServiceAccount) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            spreadsheet_id,
            account,
            token: Mutex::new(None),
        })
    }

    fn signed_assertion(&self) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.account.client_email,
            scope: SCOPE,
            aud: TOKEN_URL,
            iat: now,
            exp: now + 3600,
        };
        let pem = self.account.private_key.replace("\\n", "\n");
        let key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .context("Service account private key is not a valid RSA PEM")?;
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .context("Failed to sign service account assertion")
    }

    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some((token, expires)) = cached.as_ref() {
            if Instant::now() < *expires {
                return Ok(token.clone());
            }
        }

        let assertion = self.signed_assertion()?;
        let response: TokenResponse = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .context("Failed to reach Google token endpoint")?
            .error_for_status()
            .context("Google token endpoint rejected the service account")?
            .json()
            .await
            .context("Failed to parse Google token response")?;

        // Refresh a minute early
        let ttl = response.expires_in.unwrap_or(3600).saturating_sub(60);
        *cached = Some((
            response.access_token.clone(),
            Instant::now() + Duration::from_secs(ttl),
        ));
        Ok(response.access_token)
    }

    fn values_url(&self, range: &str, suffix: &str) -> Result<Url> {
        let mut url = Url::parse(SHEETS_URL).context("Invalid Sheets base URL")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Sheets base URL cannot hold a path"))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&format!("{}{}", range, suffix));
        Ok(url)
    }

    async fn first_sheet_title(&self, token: &str) -> Result<String> {
        let meta: SpreadsheetMeta = self
            .client
            .get(format!("{}/{}", SHEETS_URL, self.spreadsheet_id))
            .bearer_auth(token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await
            .context("Failed to fetch spreadsheet metadata")?
            .error_for_status()
            .context("Spreadsheet not found or not shared with the service account")?
            .json()
            .await
            .context("Failed to parse spreadsheet metadata")?;

        Ok(meta
            .sheets
            .into_iter()
            .next()
            .and_then(|s| s.properties)
            .and_then(|p| p.title)
            .unwrap_or_else(|| "Sheet1".to_string()))
    }

    async fn ensure_header(&self, token: &str, sheet: &str) -> Result<()> {
        let range = format!("{}!A1:F1", sheet);
        let existing: ValueRange = self
            .client
            .get(self.values_url(&range, "")?)
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to read header row")?
            .error_for_status()
            .context("Sheets rejected header read")?
            .json()
            .await
            .context("Failed to parse header row")?;

        if !existing.values.is_empty() {
            debug!("Header row already present in {}", sheet);
            return Ok(());
        }

        info!("Adding header row to {}", sheet);
        self.client
            .put(self.values_url(&range, "")?)
            .bearer_auth(token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": [HEADER_ROW] }))
            .send()
            .await
            .context("Failed to write header row")?
            .error_for_status()
            .context("Sheets rejected header write")?;
        Ok(())
    }
}

#[async_trait]
impl SpreadsheetSink for GoogleSheetsSink {
    async fn append_row(&self, values: Vec<String>) -> Result<u64> {
        let token = self.access_token().await?;
        let sheet = self.first_sheet_title(&token).await?;

        // A missing header is cosmetic; the row still goes in
        if let Err(e) = self.ensure_header(&token, &sheet).await {
            warn!("Could not check or add header row: {:#}", e);
        }

        let range = format!("{}!A:F", sheet);
        let response: AppendResponse = self
            .client
            .post(self.values_url(&range, ":append")?)
            .bearer_auth(&token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": [values] }))
            .send()
            .await
            .context("Failed to append row")?
            .error_for_status()
            .context("Sheets rejected row append")?
            .json()
            .await
            .context("Failed to parse append response")?;

        let rows = response
            .updates
            .and_then(|u| u.updated_rows)
            .unwrap_or(0);
        info!("Appended {} row(s) to spreadsheet {}", rows, self.spreadsheet_id);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_row_follows_header_layout() {
        let submission = ContactSubmission {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            message: "Hello".to_string(),
            submitted_at: Utc::now(),
            status: "new".to_string(),
        };
        let row = contact_row(&submission);
        assert_eq!(row.len(), HEADER_ROW.len());
        assert_eq!(row[1], "Ada");
        assert_eq!(row[3], "");
        assert_eq!(row[5], "new");
    }

    #[test]
    fn ranges_with_spaces_are_encoded() {
        let sink = GoogleSheetsSink::new(
            "sheet-id".to_string(),
            ServiceAccount {
                client_email: "svc@project.iam.gserviceaccount.com".to_string(),
                private_key: String::new(),
            },
        )
        .unwrap();
        let url = sink.values_url("Contact Log!A:F", ":append").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-id/values/Contact%20Log!A:F:append"
        );
    }

    #[test]
    fn invalid_private_key_fails_signing() {
        let sink = GoogleSheetsSink::new(
            "sheet-id".to_string(),
            ServiceAccount {
                client_email: "svc@project.iam.gserviceaccount.com".to_string(),
                private_key: "not a key".to_string(),
            },
        )
        .unwrap();
        assert!(sink.signed_assertion().is_err());
    }
}
