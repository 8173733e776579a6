use crate::api::AppState;
use crate::error::ApiError;
use crate::models::Listing;
use crate::state::MAX_COMPARE_ITEMS;
use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::{delete, get};
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/favorites", get(list_favorites).post(add_favorite))
        .route("/api/favorites/:id", delete(remove_favorite))
        .route(
            "/api/compare",
            get(list_compare).post(add_compare).delete(clear_compare),
        )
        .route("/api/compare/:id", delete(remove_compare))
}

#[derive(Deserialize)]
struct AddRequest {
    id: String,
}

fn listing_page(items: Vec<Listing>) -> Value {
    json!({ "count": items.len(), "items": items })
}

async fn list_favorites(State(state): State<AppState>) -> Json<Value> {
    Json(listing_page(state.favorites.list()))
}

async fn add_favorite(
    State(state): State<AppState>,
    Json(req): Json<AddRequest>,
) -> Result<Json<Value>, ApiError> {
    let listing = state.lookup(&req.id).await?;
    let added = state.favorites.add(listing);
    Ok(Json(json!({ "added": added, "count": state.favorites.count() })))
}

async fn remove_favorite(State(state): State<AppState>, Path(id): Path<String>) -> Json<Value> {
    let removed = state.favorites.remove(&id);
    Json(json!({ "removed": removed, "count": state.favorites.count() }))
}

async fn list_compare(State(state): State<AppState>) -> Json<Value> {
    let mut page = listing_page(state.comparison.list());
    page["capacity"] = json!(MAX_COMPARE_ITEMS);
    Json(page)
}

async fn add_compare(
    State(state): State<AppState>,
    Json(req): Json<AddRequest>,
) -> Result<Json<Value>, ApiError> {
    let listing = state.lookup(&req.id).await?;
    let evicted = state.comparison.add(listing);
    Ok(Json(json!({
        "evicted": evicted.map(|l| l.id),
        "items": state.comparison.list(),
    })))
}

async fn remove_compare(State(state): State<AppState>, Path(id): Path<String>) -> Json<Value> {
    let removed = state.comparison.remove(&id);
    Json(json!({ "removed": removed, "count": state.comparison.count() }))
}

async fn clear_compare(State(state): State<AppState>) -> Json<Value> {
    state.comparison.clear();
    Json(json!({ "count": 0 }))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::TestApp;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;

    fn delete(uri: &str) -> Request<Body> {
        Request::delete(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn favorites_are_idempotent() {
        let app = TestApp::new().await;
        let (_, first) = app.post_json("/api/favorites", json!({ "id": "sample-1" })).await;
        let (_, second) = app.post_json("/api/favorites", json!({ "id": "sample-1" })).await;
        assert_eq!(first, json!({ "added": true, "count": 1 }));
        assert_eq!(second, json!({ "added": false, "count": 1 }));

        let (_, removed) = app.send(delete("/api/favorites/sample-1")).await;
        assert_eq!(removed["removed"], true);
        let (_, again) = app.send(delete("/api/favorites/sample-1")).await;
        assert_eq!(again["removed"], false);
    }

    #[tokio::test]
    async fn unknown_listing_cannot_be_favorited() {
        let app = TestApp::new().await;
        let (status, _) = app.post_json("/api/favorites", json!({ "id": "nope" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn compare_evicts_oldest_at_capacity() {
        let app = TestApp::new().await;
        for id in ["sample-1", "sample-2", "sample-3"] {
            app.post_json("/api/compare", json!({ "id": id })).await;
        }
        let (_, body) = app.post_json("/api/compare", json!({ "id": "sample-4" })).await;
        assert_eq!(body["evicted"], "sample-1");

        let (_, listed) = app.get("/api/compare").await;
        let ids: Vec<&str> = listed["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["sample-2", "sample-3", "sample-4"]);
        assert_eq!(listed["capacity"], 3);

        app.send(delete("/api/compare")).await;
        let (_, cleared) = app.get("/api/compare").await;
        assert_eq!(cleared["count"], 0);
    }
}
