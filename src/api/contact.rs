use crate::api::AppState;
use crate::error::ContactError;
use crate::models::ContactForm;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Json};
use axum::routing::post;
use axum::Router;
use serde_json::json;
use tracing::warn;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/contact", post(api_contact))
}

async fn api_contact(
    State(state): State<AppState>,
    body: Result<Json<ContactForm>, JsonRejection>,
) -> Result<impl IntoResponse, ContactError> {
    let Json(form) = body.map_err(|e| {
        warn!("Unreadable contact body: {}", e);
        ContactError::Validation
    })?;

    let receipt = state.pipeline.submit(form).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Form submitted successfully! We will get back to you soon.",
        "details": receipt.channels,
    })))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::TestApp;
    use crate::notify::pipeline::testing::RecordingMailer;
    use crate::repository::MemoryRepository;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn blank_name_is_rejected_before_any_side_effect() {
        let app = TestApp::new().await;
        let (status, body) = app
            .post_json(
                "/api/contact",
                json!({ "name": "", "email": "a@b.com", "message": "hi" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");
        assert!(app.mailer.sent().is_empty());
        assert!(app.repo.contacts().await.is_empty());
    }

    #[tokio::test]
    async fn success_reports_each_channel() {
        let app = TestApp::new().await;
        let (status, body) = app
            .post_json(
                "/api/contact",
                json!({ "name": "Ada", "email": "ada@example.com", "message": "Viewing?" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(
            body["details"],
            json!({ "emailSent": true, "firebaseSaved": true, "sheetsSaved": false })
        );
        assert_eq!(app.mailer.sent().len(), 2);
        assert_eq!(app.repo.contacts().await[0].status, "new");
    }

    #[tokio::test]
    async fn best_effort_failures_still_succeed() {
        let repo = MemoryRepository::with_samples();
        repo.set_fail_writes(true);
        let app = TestApp::with_repo(repo, RecordingMailer::default()).await;

        let (status, body) = app
            .post_json(
                "/api/contact",
                json!({ "name": "Ada", "email": "ada@example.com", "message": "Hi" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["details"],
            json!({ "emailSent": true, "firebaseSaved": false, "sheetsSaved": false })
        );
    }

    #[tokio::test]
    async fn email_failure_is_a_server_error() {
        let app = TestApp::with_repo(MemoryRepository::with_samples(), RecordingMailer::failing())
            .await;
        let (status, body) = app
            .post_json(
                "/api/contact",
                json!({ "name": "Ada", "email": "ada@example.com", "message": "Hi" }),
            )
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to send email notification");
        assert!(app.repo.contacts().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_a_client_error() {
        let app = TestApp::new().await;
        let (status, _) = app
            .send(
                Request::post("/api/contact")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
