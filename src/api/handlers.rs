//! HTTP request handlers

use super::types::{ErrorResponse, PayloadQuery};
use super::AppState;
use crate::dispatch::Inbound;
use crate::state_machine::UserId;
use crate::telegram::Update;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::sync::mpsc::error::TrySendError;

pub const HEALTH_TEXT: &str = "The bot is still running fine :)";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Platform updates
        .route("/telegram", post(telegram_update))
        // Custom payload callback
        .route("/submitpayload", get(submit_payload).post(submit_payload))
        .route("/healthcheck", get(healthcheck))
        .with_state(state)
}

async fn telegram_update(
    State(state): State<AppState>,
    Json(update): Json<Update>,
) -> Result<StatusCode, AppError> {
    let update_id = update.update_id;
    match Inbound::from_update(update) {
        Some(event) => enqueue(&state, event)?,
        None => tracing::debug!(update_id, "Ignoring update without text message"),
    }
    Ok(StatusCode::OK)
}

async fn submit_payload(
    State(state): State<AppState>,
    Query(query): Query<PayloadQuery>,
) -> Result<StatusCode, AppError> {
    let (Some(user_id), Some(payload)) = (query.user_id, query.payload) else {
        return Err(AppError::BadRequest(
            "Please pass both `user_id` and `payload` as query parameters.".to_string(),
        ));
    };
    let user_id: i64 = user_id
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest("The `user_id` must be an integer.".to_string()))?;

    enqueue(
        &state,
        Inbound::Payload {
            user_id: UserId(user_id),
            payload,
        },
    )?;
    Ok(StatusCode::OK)
}

async fn healthcheck() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], HEALTH_TEXT)
}

fn enqueue(state: &AppState, event: Inbound) -> Result<(), AppError> {
    state.events.try_send(event).map_err(|e| match e {
        TrySendError::Full(_) => AppError::Unavailable("Event queue is full".to_string()),
        TrySendError::Closed(_) => AppError::Internal("Event queue is closed".to_string()),
    })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Unavailable(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    fn app(capacity: usize) -> (Router, mpsc::Receiver<Inbound>) {
        let (tx, rx) = mpsc::channel(capacity);
        (create_router(AppState::new(tx)), rx)
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_healthcheck() {
        let (router, _rx) = app(1);
        let response = router
            .oneshot(Request::get("/healthcheck").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(body_text(response).await, HEALTH_TEXT);
    }

    #[tokio::test]
    async fn test_telegram_update_is_enqueued() {
        let (router, mut rx) = app(4);
        let body = serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": 9,
                "chat": { "id": 77 },
                "from": { "id": 77, "first_name": "Ada" },
                "text": "12.5"
            }
        });
        let response = router
            .oneshot(
                Request::post("/telegram")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            rx.try_recv().unwrap(),
            Inbound::Message {
                chat_id: 77,
                user_id: UserId(77),
                text: "12.5".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_non_text_update_is_accepted_and_dropped() {
        let (router, mut rx) = app(4);
        let response = router
            .oneshot(
                Request::post("/telegram")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"update_id": 2}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_submit_payload_get_and_post() {
        for method in ["GET", "POST"] {
            let (router, mut rx) = app(4);
            let response = router
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri("/submitpayload?user_id=5&payload=hello%20world")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{method}");
            assert_eq!(
                rx.try_recv().unwrap(),
                Inbound::Payload {
                    user_id: UserId(5),
                    payload: "hello world".to_string()
                }
            );
        }
    }

    #[tokio::test]
    async fn test_submit_payload_rejects_bad_query() {
        for uri in [
            "/submitpayload?user_id=5",
            "/submitpayload?payload=x",
            "/submitpayload?user_id=abc&payload=x",
        ] {
            let (router, mut rx) = app(4);
            let response = router
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert!(body_text(response).await.contains("error"));
            assert!(rx.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn test_full_queue_is_unavailable() {
        let (router, _rx) = app(1);
        let uri = "/submitpayload?user_id=5&payload=x";
        let first = router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
