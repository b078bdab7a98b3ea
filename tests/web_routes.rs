use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::DateTime;
use chrono_tz::Asia::Kolkata;
use chrono_tz::Tz;
use schedule_bot::calendar::{CalendarSource, RawEvent};
use schedule_bot::chat::{ChatResult, ChatService, LanguageModel, Responder};
use schedule_bot::config::AssistantProfile;
use schedule_bot::error::{assistant_error, BotResult};
use schedule_bot::web::handlers::UNAVAILABLE_REPLY;
use schedule_bot::web::{build_router, AppState, MAX_BODY_BYTES};
use std::sync::Arc;
use tower::ServiceExt;

struct EmptyCalendar;

#[async_trait]
impl CalendarSource for EmptyCalendar {
    fn name(&self) -> &'static str {
        "empty"
    }

    async fn list_events_between(
        &self,
        _start: DateTime<Tz>,
        _end: DateTime<Tz>,
    ) -> BotResult<Vec<RawEvent>> {
        Ok(Vec::new())
    }
}

/// Model that answers with the question it was asked
struct EchoModel;

#[async_trait]
impl LanguageModel for EchoModel {
    async fn complete(&self, _system_prompt: &str, user_prompt: &str) -> BotResult<String> {
        let question = user_prompt
            .rsplit("USER_QUESTION:\n")
            .next()
            .unwrap_or_default();
        Ok(format!("echo: {}", question))
    }
}

struct DownModel;

#[async_trait]
impl LanguageModel for DownModel {
    async fn complete(&self, _system_prompt: &str, _user_prompt: &str) -> BotResult<String> {
        Err(assistant_error("connection refused"))
    }
}

fn app(model: Arc<dyn LanguageModel>) -> Router {
    let responder = Responder::new(model).with_max_retries(0);
    let chat = ChatService::new(
        Arc::new(EmptyCalendar),
        responder,
        &AssistantProfile::default(),
        Kolkata,
    );
    build_router(AppState {
        chat: Arc::new(chat),
    })
}

fn chat_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

async fn read_result(response: axum::response::Response) -> ChatResult {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_chat_returns_reply() {
    let response = app(Arc::new(EchoModel))
        .oneshot(chat_request(
            r#"{"message": "3", "conversation_state": null}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let result = read_result(response).await;
    assert_eq!(result.reply, "echo: Appointment option selected.");
    assert_eq!(result, ChatResult::new("echo: Appointment option selected."));
}

#[tokio::test]
async fn test_invalid_json_is_treated_as_empty_message() {
    let response = app(Arc::new(EchoModel))
        .oneshot(chat_request("{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    // An empty question leaves nothing to echo
    assert_eq!(read_result(response).await.reply, "echo:");
}

#[tokio::test]
async fn test_model_failure_is_service_unavailable() {
    let response = app(Arc::new(DownModel))
        .oneshot(chat_request(r#"{"message": "hi"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(read_result(response).await.reply, UNAVAILABLE_REPLY);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let body = format!(r#"{{"message": "{}"}}"#, "a".repeat(MAX_BODY_BYTES + 1));
    let response = app(Arc::new(EchoModel))
        .oneshot(chat_request(body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_health_and_index() {
    let router = app(Arc::new(EchoModel));

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");

    let response = router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("fetch(\"/chat\""));
}

#[tokio::test]
async fn test_chat_rejects_get() {
    let response = app(Arc::new(EchoModel))
        .oneshot(Request::builder().uri("/chat").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
