use crate::admin::{create_listing, replace_images, AdminCommand, CreateError};
use crate::api::AppState;
use crate::auth::{require_session, AuthService, Identity};
use crate::error::ApiError;
use crate::models::{Listing, ListingDraft, ListingPatch};
use crate::uploads::audit::{audit_listing, ImageAudit};
use crate::uploads::ImageFile;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, patch, post};
use axum::{Extension, Router};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Ceiling for one admin form, photos included
pub const MAX_FORM_BYTES: usize = 25 * 1024 * 1024;

/// Admin routes; every one sits behind the session gate
pub fn router(auth: Arc<AuthService>) -> Router<AppState> {
    Router::new()
        .route("/api/admin/summary", get(summary))
        .route("/api/admin/properties", post(create))
        .route("/api/admin/properties/:id", patch(update).delete(remove))
        .route("/api/admin/properties/:id/sold", post(mark_sold))
        .route(
            "/api/admin/properties/:id/images",
            get(images).post(upload_images),
        )
        .route_layer(middleware::from_fn_with_state(auth, require_session))
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
}

async fn summary(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> impl IntoResponse {
    Json(json!({
        "identity": identity,
        "counts": state.dashboard.summary(),
    }))
}

struct ImageForm {
    draft: Option<ListingDraft>,
    main_image: Option<ImageFile>,
    gallery: Vec<ImageFile>,
}

async fn read_image(
    field: axum::extract::multipart::Field<'_>,
) -> Result<Option<ImageFile>, ApiError> {
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Unreadable image upload: {}", e)))?;
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(ImageFile::new(&file_name, &content_type, bytes.to_vec())))
}

async fn read_image_form(mut multipart: Multipart) -> Result<ImageForm, ApiError> {
    let mut draft = None;
    let mut main_image = None;
    let mut gallery = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed form: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "listing" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Unreadable listing: {}", e)))?;
                let parsed: ListingDraft = serde_json::from_str(&raw)
                    .map_err(|e| ApiError::BadRequest(format!("Invalid listing: {}", e)))?;
                draft = Some(parsed);
            }
            "mainImage" => main_image = read_image(field).await?,
            "images" => gallery.extend(read_image(field).await?),
            other => warn!("Ignoring unexpected form field {:?}", other),
        }
    }

    Ok(ImageForm {
        draft,
        main_image,
        gallery,
    })
}

async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_image_form(multipart).await?;
    let draft = form
        .draft
        .ok_or_else(|| ApiError::BadRequest("Missing listing".to_string()))?;
    info!("{} is creating listing {}", identity.email, draft.title);

    let created = create_listing(
        state.cache.repository().as_ref(),
        &state.uploader,
        draft,
        form.main_image,
        form.gallery,
    )
    .await
    .map_err(|e| match e {
        CreateError::Invalid(e) => ApiError::BadRequest(e.to_string()),
        CreateError::Store(e) => ApiError::Upstream(e),
    })?;

    let _ = state.cache.refresh().await;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ListingPatch>,
) -> Result<Json<Listing>, ApiError> {
    if patch.is_empty() {
        return Err(ApiError::BadRequest("Nothing to update".to_string()));
    }
    patch
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let repo = state.cache.repository();
    if repo.fetch_by_id(&id).await?.is_none() {
        return Err(ApiError::NotFound("Property"));
    }
    repo.update(&id, &patch).await?;
    let _ = state.cache.refresh().await;

    state.lookup(&id).await.map(Json)
}

async fn mark_sold(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.lookup(&id).await?;
    state
        .dashboard
        .run(AdminCommand::MarkSold { id: id.clone() })
        .await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "id": id, "status": "Sold" })),
    ))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.lookup(&id).await?;
    state
        .dashboard
        .run(AdminCommand::Delete { id: id.clone() })
        .await?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "deleted": id }))))
}

async fn upload_images(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let listing = state.lookup(&id).await?;
    let form = read_image_form(multipart).await?;
    if form.draft.is_some() {
        warn!("Ignoring listing part on image upload for {}", id);
    }
    if form.main_image.is_none() && form.gallery.is_empty() {
        return Err(ApiError::BadRequest("No images to upload".to_string()));
    }
    info!("{} is replacing images on listing {}", identity.email, id);

    let replaced = replace_images(
        state.cache.repository().as_ref(),
        &state.uploader,
        &listing,
        form.main_image,
        form.gallery,
    )
    .await?;

    let _ = state.cache.refresh().await;
    Ok(Json(replaced))
}

async fn images(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ImageAudit>, ApiError> {
    let listing = state.lookup(&id).await?;
    Ok(Json(audit_listing(&listing)))
}
