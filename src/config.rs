//! Environment-driven configuration. Every variable is optional; anything
//! missing selects a demo or disabled adapter instead of failing startup.

use crate::auth::{AuthProvider, DemoAuthProvider, FirebaseAuthProvider};
use crate::notify::{
    DisabledMailer, GoogleSheetsSink, Mailer, ServiceAccount, SmtpConfig, SmtpMailer,
    SpreadsheetSink,
};
use crate::repository::{ContactRepository, FirestoreRepository, ListingRepository, MemoryRepository};
use crate::uploads::{
    CloudinaryConfig, CloudinaryHost, ImageHost, ImageProvider, ImgurHost, LocalHost, UnsplashHost,
};
use anyhow::Result;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_BIND: &str = "0.0.0.0:3000";
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    pub project_id: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub account: ServiceAccount,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub data_dir: PathBuf,
    pub firebase: Option<FirebaseConfig>,
    pub image_provider: ImageProvider,
    pub cloudinary: CloudinaryConfig,
    pub imgur_client_id: String,
    pub smtp: Option<SmtpConfig>,
    pub company_email: String,
    pub sheets: Option<SheetsConfig>,
}

/// Listing and contact stores; both views of the same backend
pub struct Stores {
    pub listings: Arc<dyn ListingRepository>,
    pub contacts: Arc<dyn ContactRepository>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let firebase = get("FIREBASE_PROJECT_ID").map(|project_id| FirebaseConfig {
            project_id,
            api_key: get("FIREBASE_API_KEY"),
        });

        let smtp = match (get("EMAIL_USER"), get("EMAIL_PASSWORD")) {
            (Some(user), Some(password)) => Some(SmtpConfig {
                host: get("EMAIL_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
                port: parse_or("EMAIL_PORT", get("EMAIL_PORT"), DEFAULT_SMTP_PORT),
                secure: get("EMAIL_SECURE").is_some_and(|v| v.eq_ignore_ascii_case("true")),
                from: get("EMAIL_FROM").unwrap_or_else(|| user.clone()),
                user,
                password,
            }),
            _ => None,
        };

        let company_email = get("COMPANY_EMAIL")
            .or_else(|| smtp.as_ref().map(|s| s.user.clone()))
            .unwrap_or_default();

        let sheets = match (
            get("GOOGLE_SHEETS_ID"),
            get("GOOGLE_SERVICE_ACCOUNT_EMAIL"),
            get("GOOGLE_SERVICE_ACCOUNT_PRIVATE_KEY"),
        ) {
            (Some(spreadsheet_id), Some(client_email), Some(private_key)) => Some(SheetsConfig {
                spreadsheet_id,
                account: ServiceAccount {
                    client_email,
                    private_key,
                },
            }),
            _ => None,
        };

        Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            data_dir: get("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            firebase,
            image_provider: get("IMAGE_PROVIDER")
                .map(|p| ImageProvider::parse(&p))
                .unwrap_or(ImageProvider::Local),
            cloudinary: CloudinaryConfig {
                cloud_name: get("CLOUDINARY_CLOUD_NAME").unwrap_or_default(),
                upload_preset: get("CLOUDINARY_UPLOAD_PRESET").unwrap_or_default(),
            },
            imgur_client_id: get("IMGUR_CLIENT_ID").unwrap_or_default(),
            smtp,
            company_email,
            sheets,
        }
    }

    pub fn demo_mode(&self) -> bool {
        self.firebase.is_none()
    }

    pub fn stores(&self) -> Result<Stores> {
        match &self.firebase {
            Some(firebase) => {
                info!("Using Firestore project {}", firebase.project_id);
                let repo = Arc::new(FirestoreRepository::new(
                    &firebase.project_id,
                    firebase.api_key.clone(),
                )?);
                Ok(Stores {
                    listings: repo.clone(),
                    contacts: repo,
                })
            }
            None => {
                warn!("FIREBASE_PROJECT_ID not set, using in-memory sample catalogue");
                let repo = Arc::new(MemoryRepository::with_samples());
                Ok(Stores {
                    listings: repo.clone(),
                    contacts: repo,
                })
            }
        }
    }

    /// Image host picked once here; call sites never branch on the provider
    pub fn image_host(&self) -> Result<Arc<dyn ImageHost>> {
        let host: Arc<dyn ImageHost> = match self.image_provider {
            ImageProvider::Cloudinary => Arc::new(CloudinaryHost::new(self.cloudinary.clone())?),
            ImageProvider::Imgur => Arc::new(ImgurHost::new(self.imgur_client_id.clone())?),
            ImageProvider::Unsplash => Arc::new(UnsplashHost::default()),
            ImageProvider::Local => Arc::new(LocalHost),
        };
        info!("Image uploads go to {}", self.image_provider);
        Ok(host)
    }

    pub fn mailer(&self) -> Result<Arc<dyn Mailer>> {
        match &self.smtp {
            Some(smtp) => Ok(Arc::new(SmtpMailer::new(smtp)?)),
            None => {
                warn!("EMAIL_USER/EMAIL_PASSWORD not set, outgoing mail is disabled");
                Ok(Arc::new(DisabledMailer))
            }
        }
    }

    pub fn spreadsheet(&self) -> Result<Option<Arc<dyn SpreadsheetSink>>> {
        match &self.sheets {
            Some(sheets) => {
                let sink =
                    GoogleSheetsSink::new(sheets.spreadsheet_id.clone(), sheets.account.clone())?;
                Ok(Some(Arc::new(sink)))
            }
            None => {
                info!("Google Sheets not configured, submissions will not be appended");
                Ok(None)
            }
        }
    }

    pub fn auth_provider(&self) -> Result<Arc<dyn AuthProvider>> {
        match self.firebase.as_ref().and_then(|f| f.api_key.clone()) {
            Some(api_key) => Ok(Arc::new(FirebaseAuthProvider::new(api_key)?)),
            None => {
                warn!("FIREBASE_API_KEY not set, admin sign-in uses demo credentials");
                Ok(Arc::new(DemoAuthProvider))
            }
        }
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match raw {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{}={} is not valid, using {}", key, raw, default);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_selects_demo_adapters() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_addr, "0.0.0.0:3000");
        assert_eq!(cfg.data_dir, PathBuf::from("./data"));
        assert!(cfg.demo_mode());
        assert!(cfg.smtp.is_none());
        assert!(cfg.sheets.is_none());
        assert_eq!(cfg.image_provider, ImageProvider::Local);
    }

    #[test]
    fn bad_port_falls_back_to_default() {
        let cfg = config(&[
            ("EMAIL_USER", "agent@example.com"),
            ("EMAIL_PASSWORD", "secret"),
            ("EMAIL_PORT", "smtp"),
        ]);
        let smtp = cfg.smtp.unwrap();
        assert_eq!(smtp.port, 587);
        assert_eq!(smtp.from, "agent@example.com");
        assert_eq!(cfg.company_email, "agent@example.com");
    }

    #[test]
    fn sheets_need_all_three_values() {
        let partial = config(&[
            ("GOOGLE_SHEETS_ID", "sheet"),
            ("GOOGLE_SERVICE_ACCOUNT_EMAIL", "svc@example.iam.gserviceaccount.com"),
        ]);
        assert!(partial.sheets.is_none());
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config(&[("FIREBASE_PROJECT_ID", "  "), ("IMAGE_PROVIDER", "imgur")]);
        assert!(cfg.demo_mode());
        assert_eq!(cfg.image_provider, ImageProvider::Imgur);
    }

    #[tokio::test]
    async fn demo_stores_are_seeded() {
        let stores = config(&[]).stores().unwrap();
        assert_eq!(stores.listings.fetch_all().await.unwrap().len(), 7);
    }
}
