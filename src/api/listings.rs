use crate::api::AppState;
use crate::error::ApiError;
use crate::models::Listing;
use crate::search::{self, Criteria, ListingQuery, Page, SortOrder, PAGE_SIZE};
use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use std::collections::HashMap;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/properties", get(api_properties))
        .route("/api/properties/featured", get(api_featured))
        .route("/api/properties/:id", get(api_property))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListingsResponse {
    #[serde(flatten)]
    page: Page<Listing>,
    criteria: Criteria,
    sort: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Filtered, sorted page of the cached catalogue. An empty page is a normal
/// response; the active criteria come back so the caller can adjust them.
async fn api_properties(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<ListingsResponse> {
    let query = ListingQuery::from_query(&params);
    let snapshot = state.cache.snapshot();
    let page = search::run(&snapshot.listings, &query, PAGE_SIZE);

    Json(ListingsResponse {
        page,
        criteria: query.criteria,
        sort: query.sort,
        error: snapshot.error,
    })
}

async fn api_featured(State(state): State<AppState>) -> Json<Vec<Listing>> {
    Json(state.cache.featured())
}

async fn api_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Listing>, ApiError> {
    state.lookup(&id).await.map(Json)
}

#[cfg(test)]
mod tests {
    use crate::api::testing::TestApp;
    use crate::models::fixtures::listing;
    use crate::notify::pipeline::testing::RecordingMailer;
    use crate::repository::MemoryRepository;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn price_and_bedroom_filters_compose() {
        let repo = MemoryRepository::with_listings(vec![
            listing("a", 350_000.0, 3),
            listing("b", 450_000.0, 4),
            listing("c", 450_000.0, 2),
            listing("d", 650_000.0, 5),
            listing("e", 300_000.0, 3),
        ]);
        let app = TestApp::with_repo(repo, RecordingMailer::default()).await;

        let (status, body) = app
            .get("/api/properties?minPrice=300000&maxPrice=500000&bedrooms=3&sort=price-asc")
            .await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["e", "a", "b"]);
        assert_eq!(body["total"], 3);
        assert_eq!(body["criteria"]["minPrice"], 300_000.0);
    }

    #[tokio::test]
    async fn pages_are_clamped_and_windowed() {
        let listings = (0..14).map(|i| listing(&i.to_string(), 100_000.0, 1)).collect();
        let app = TestApp::with_repo(
            MemoryRepository::with_listings(listings),
            RecordingMailer::default(),
        )
        .await;

        let (_, body) = app.get("/api/properties?page=99").await;
        assert_eq!(body["page"], 3);
        assert_eq!(body["totalPages"], 3);
        assert_eq!(body["pageSize"], 6);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
        assert_eq!(body["pageWindow"], serde_json::json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn garbage_criteria_are_ignored() {
        let app = TestApp::new().await;
        let (status, body) = app.get("/api/properties?minPrice=cheap&bedrooms=").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 7);
        assert_eq!(body["criteria"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn no_results_is_not_an_error() {
        let app = TestApp::new().await;
        let (status, body) = app.get("/api/properties?location=Nowhere").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
        assert_eq!(body["criteria"]["location"], "Nowhere");
    }

    #[tokio::test]
    async fn featured_and_single_lookup() {
        let app = TestApp::new().await;
        let (_, featured) = app.get("/api/properties/featured").await;
        assert_eq!(featured.as_array().unwrap().len(), 3);

        let (status, body) = app.get("/api/properties/sample-1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "sample-1");

        let (status, body) = app.get("/api/properties/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Property not found");
    }
}
