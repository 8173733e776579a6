use crate::models::{ContactSubmission, Listing, ListingDraft, ListingPatch};
use crate::repository::document::{
    from_firestore_fields, listing_from_document, to_firestore_fields, Document,
};
use crate::repository::traits::{ContactRepository, ListingRepository};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

const PROPERTIES: &str = "properties";
const CONTACTS: &str = "contacts";
const PAGE_SIZE: u32 = 300;

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Document,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryRow {
    document: Option<RawDocument>,
}

impl RawDocument {
    fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }

    fn into_listing(self) -> Option<Listing> {
        let id = self.id().to_string();
        let body = from_firestore_fields(&self.fields);
        match listing_from_document(&id, &body) {
            Ok(listing) => Some(listing),
            Err(e) => {
                warn!("Skipping malformed listing {}: {}", id, e);
                None
            }
        }
    }
}

/// Firestore REST adapter for the `properties` and `contacts` collections
pub struct FirestoreRepository {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl FirestoreRepository {
    pub fn new(project_id: &str, api_key: Option<String>) -> Result<Self> {
        let base_url = format!(
            "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents",
            project_id
        );
        Self::with_base_url(base_url, api_key)
    }

    /// Point the adapter at an arbitrary documents root (emulator, tests)
    pub fn with_base_url(base_url: String, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn keyed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.query(&[("key", key.as_str())]),
            None => request,
        }
    }

    async fn create_document(&self, collection: &str, body: Document) -> Result<String> {
        let response = self
            .keyed(self.client.post(self.url(collection)))
            .json(&json!({ "fields": to_firestore_fields(&body) }))
            .send()
            .await
            .with_context(|| format!("Failed to create document in {}", collection))?
            .error_for_status()
            .with_context(|| format!("Firestore rejected new {} document", collection))?;

        let created: RawDocument = response
            .json()
            .await
            .context("Failed to parse created document")?;
        Ok(created.id().to_string())
    }
}

fn to_document<T: serde::Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value).context("Failed to serialize document")? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("Expected an object document, got {}", other),
    }
}

#[async_trait]
impl ListingRepository for FirestoreRepository {
    async fn fetch_all(&self) -> Result<Vec<Listing>> {
        let mut listings = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .keyed(self.client.get(self.url(PROPERTIES)))
                .query(&[("pageSize", PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: ListResponse = request
                .send()
                .await
                .context("Failed to fetch listings")?
                .error_for_status()
                .context("Firestore returned an error listing properties")?
                .json()
                .await
                .context("Failed to parse listings page")?;

            listings.extend(page.documents.into_iter().filter_map(RawDocument::into_listing));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("Fetched {} listings from Firestore", listings.len());
        Ok(listings)
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<Listing>> {
        let response = self
            .keyed(self.client.get(self.url(&format!("{}/{}", PROPERTIES, id))))
            .send()
            .await
            .with_context(|| format!("Failed to fetch listing {}", id))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let doc: RawDocument = response
            .error_for_status()
            .with_context(|| format!("Firestore returned an error for listing {}", id))?
            .json()
            .await
            .context("Failed to parse listing document")?;
        Ok(doc.into_listing())
    }

    async fn fetch_featured(&self) -> Result<Vec<Listing>> {
        let query = json!({
            "structuredQuery": {
                "from": [{ "collectionId": PROPERTIES }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "featured" },
                        "op": "EQUAL",
                        "value": { "booleanValue": true }
                    }
                }
            }
        });

        let rows: Vec<QueryRow> = self
            .keyed(self.client.post(format!("{}:runQuery", self.base_url)))
            .json(&query)
            .send()
            .await
            .context("Failed to query featured listings")?
            .error_for_status()
            .context("Firestore rejected featured query")?
            .json()
            .await
            .context("Failed to parse featured query result")?;

        Ok(rows
            .into_iter()
            .filter_map(|row| row.document)
            .filter_map(RawDocument::into_listing)
            .collect())
    }

    async fn create(&self, draft: &ListingDraft) -> Result<String> {
        let mut body = to_document(draft)?;
        body.insert("createdAt".to_string(), json!(Utc::now().to_rfc3339()));
        let id = self.create_document(PROPERTIES, body).await?;
        info!("Created listing {}", id);
        Ok(id)
    }

    async fn update(&self, id: &str, patch: &ListingPatch) -> Result<()> {
        let mut body = to_document(patch)?;
        body.insert("updatedAt".to_string(), json!(Utc::now().to_rfc3339()));

        let mask: Vec<(&str, &str)> = body
            .keys()
            .map(|k| ("updateMask.fieldPaths", k.as_str()))
            .collect();

        self.keyed(self.client.patch(self.url(&format!("{}/{}", PROPERTIES, id))))
            .query(&mask)
            .query(&[("currentDocument.exists", "true")])
            .json(&json!({ "fields": to_firestore_fields(&body) }))
            .send()
            .await
            .with_context(|| format!("Failed to update listing {}", id))?
            .error_for_status()
            .with_context(|| format!("Firestore rejected update of listing {}", id))?;

        debug!("Updated listing {} ({} fields)", id, mask.len());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.keyed(self.client.delete(self.url(&format!("{}/{}", PROPERTIES, id))))
            .send()
            .await
            .with_context(|| format!("Failed to delete listing {}", id))?
            .error_for_status()
            .with_context(|| format!("Firestore rejected delete of listing {}", id))?;
        info!("Deleted listing {}", id);
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "Firestore"
    }
}

#[async_trait]
impl ContactRepository for FirestoreRepository {
    async fn save_contact(&self, submission: &ContactSubmission) -> Result<String> {
        let mut body = to_document(submission)?;
        body.insert("createdAt".to_string(), json!(Utc::now().to_rfc3339()));
        self.create_document(CONTACTS, body).await
    }
}
