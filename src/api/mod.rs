//! HTTP surface. Each submodule contributes a router; `router` merges them
//! over one shared `AppState`.

pub mod admin;
pub mod auth;
pub mod collections;
pub mod contact;
pub mod health;
pub mod listings;

use crate::admin::Dashboard;
use crate::auth::AuthService;
use crate::config::Config;
use crate::error::ApiError;
use crate::models::Listing;
use crate::notify::ContactPipeline;
use crate::state::{Comparison, Favorites, JsonFileStore, ListingCache, LocalStore};
use crate::uploads::ImageUploader;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Containers and adapters shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub cache: ListingCache,
    pub pipeline: ContactPipeline,
    pub uploader: ImageUploader,
    pub favorites: Arc<Favorites>,
    pub comparison: Arc<Comparison>,
    pub auth: Arc<AuthService>,
    pub dashboard: Arc<Dashboard>,
}

impl AppState {
    pub fn new(
        cache: ListingCache,
        pipeline: ContactPipeline,
        uploader: ImageUploader,
        local: Arc<dyn LocalStore>,
        auth: AuthService,
    ) -> Self {
        Self {
            dashboard: Arc::new(Dashboard::new(cache.clone())),
            cache,
            pipeline,
            uploader,
            favorites: Arc::new(Favorites::new(local.clone())),
            comparison: Arc::new(Comparison::new(local)),
            auth: Arc::new(auth),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let stores = config.stores()?;
        let pipeline = ContactPipeline::new(
            config.mailer()?,
            config.company_email.clone(),
            stores.contacts,
            config.spreadsheet()?,
        );
        let local: Arc<dyn LocalStore> = Arc::new(JsonFileStore::new(config.data_dir.clone()));

        Ok(Self::new(
            ListingCache::new(stores.listings),
            pipeline,
            ImageUploader::new(config.image_host()?),
            local,
            AuthService::new(config.auth_provider()?),
        ))
    }

    /// Hydrate the containers, settle the session signal and load listings
    pub async fn start(&self) {
        tokio::join!(self.favorites.init(), self.comparison.init());
        self.auth.start().await;
        if let Err(e) = self.cache.refresh().await {
            warn!("Starting with an empty catalogue: {:#}", e);
        }
        info!(
            "Ready: {} listings, {} favorites, {} compared",
            self.cache.listings().len(),
            self.favorites.count(),
            self.comparison.count()
        );
    }

    /// Flush pending local writes
    pub async fn shutdown(&self) {
        tokio::join!(self.favorites.dispose(), self.comparison.dispose());
        info!("Local state flushed");
    }

    /// Cached listing, falling back to the store for anything not cached yet
    pub async fn lookup(&self, id: &str) -> Result<Listing, ApiError> {
        if let Some(listing) = self.cache.find(id) {
            return Ok(listing);
        }
        self.cache
            .repository()
            .fetch_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Property"))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(listings::router())
        .merge(contact::router())
        .merge(collections::router())
        .merge(auth::router())
        .merge(admin::router(state.auth.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::auth::DemoAuthProvider;
    use crate::notify::pipeline::testing::RecordingMailer;
    use crate::repository::MemoryRepository;
    use crate::state::MemoryStore;
    use crate::uploads::testing::RecordingHost;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    pub struct TestApp {
        pub state: AppState,
        pub repo: Arc<MemoryRepository>,
        pub mailer: Arc<RecordingMailer>,
        pub host: Arc<RecordingHost>,
    }

    impl TestApp {
        pub async fn with_repo(repo: MemoryRepository, mailer: RecordingMailer) -> Self {
            let repo = Arc::new(repo);
            let mailer = Arc::new(mailer);
            let host = Arc::new(RecordingHost::default());
            let state = AppState::new(
                ListingCache::new(repo.clone()),
                ContactPipeline::new(
                    mailer.clone(),
                    "office@example.com".to_string(),
                    repo.clone(),
                    None,
                ),
                ImageUploader::new(host.clone()),
                Arc::new(MemoryStore::new()),
                AuthService::new(Arc::new(DemoAuthProvider)),
            );
            state.start().await;
            Self {
                state,
                repo,
                mailer,
                host,
            }
        }

        pub async fn new() -> Self {
            Self::with_repo(MemoryRepository::with_samples(), RecordingMailer::default()).await
        }

        pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = router(self.state.clone())
                .oneshot(request)
                .await
                .unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, body)
        }

        pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.send(Request::get(uri).body(Body::empty()).unwrap()).await
        }

        pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            self.send(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
        }

        /// Sign in with the demo account and return the session token
        pub async fn login(&self) -> String {
            let session = self
                .state
                .auth
                .sign_in(
                    crate::auth::provider::DEMO_EMAIL,
                    crate::auth::provider::DEMO_PASSWORD,
                )
                .await
                .unwrap();
            session.token
        }
    }
}
