//! Chat session HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/sessions                - Open a locked session
//! - GET    /api/v1/sessions/{id}           - Current snapshot
//! - PUT    /api/v1/sessions/{id}/visitor   - Edit the intake draft
//! - POST   /api/v1/sessions/{id}/intake    - Submit the intake form
//! - POST   /api/v1/sessions/{id}/messages  - One round-trip
//! - DELETE /api/v1/sessions/{id}           - Flush writes and close

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use talentchat_core::chat::registry::SharedWidget;
use talentchat_core::chat::widget::{FieldErrorView, SendOutcome, WidgetSnapshot};
use talentchat_infra::inference::HttpInferenceClient;
use talentchat_types::config::Locale;
use talentchat_types::error::{ChatError, IntakeError};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct OpenSessionQuery {
    pub locale: Option<Locale>,
}

#[derive(Debug, Deserialize)]
pub struct VisitorDraft {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IntakeRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ClosedSession {
    pub id: Uuid,
    pub pending_writes: usize,
}

type SnapshotResponse = Json<ApiResponse<WidgetSnapshot>>;

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

fn find_session(state: &AppState, id: &str) -> Result<SharedWidget<HttpInferenceClient>, AppError> {
    let uuid = parse_uuid(id)?;
    state
        .sessions
        .get(&uuid)
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))
}

/// POST /api/v1/sessions - Open a session with the intake gate open.
pub async fn open_session(
    State(state): State<AppState>,
    Query(query): Query<OpenSessionQuery>,
) -> (StatusCode, SnapshotResponse) {
    let start = Instant::now();
    let (id, widget) = state.sessions.open(query.locale);
    let snapshot = widget.lock().await.snapshot();
    tracing::info!(session_id = %id, sessions = state.sessions.len(), "Session opened over HTTP");
    (StatusCode::CREATED, Json(ApiResponse::success(snapshot, start)))
}

/// GET /api/v1/sessions/{id} - Current snapshot.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<SnapshotResponse, AppError> {
    let start = Instant::now();
    let widget = find_session(&state, &id)?;
    let snapshot = widget.lock().await.snapshot();
    Ok(Json(ApiResponse::success(snapshot, start)))
}

/// PUT /api/v1/sessions/{id}/visitor - Edit intake fields before submitting.
pub async fn update_visitor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<VisitorDraft>,
) -> Result<SnapshotResponse, AppError> {
    let start = Instant::now();
    let widget = find_session(&state, &id)?;
    let mut widget = widget.lock().await;
    if widget.is_unlocked() {
        return Err(AppError::AlreadyUnlocked);
    }
    if let Some(name) = draft.name {
        widget.set_name(name);
    }
    if let Some(email) = draft.email {
        widget.set_email(email);
    }
    Ok(Json(ApiResponse::success(widget.snapshot(), start)))
}

/// POST /api/v1/sessions/{id}/intake - Submit the intake form.
///
/// 422 with per-field errors when the profile is invalid; the gate stays open.
pub async fn submit_intake(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<IntakeRequest>,
) -> Result<SnapshotResponse, AppError> {
    let start = Instant::now();
    let widget = find_session(&state, &id)?;
    let mut widget = widget.lock().await;
    if widget.is_unlocked() {
        return Err(AppError::AlreadyUnlocked);
    }

    widget.set_name(body.name);
    widget.set_email(body.email);
    match widget.submit_intake() {
        Ok(_) => Ok(Json(ApiResponse::success(widget.snapshot(), start))),
        Err(IntakeError::Rejected(errors)) => {
            let locale = widget.locale();
            Err(AppError::Intake(
                errors
                    .into_iter()
                    .map(|code| FieldErrorView {
                        field: code.field(),
                        code,
                        message: code.message(locale),
                    })
                    .collect(),
            ))
        }
        Err(IntakeError::AlreadyUnlocked) => Err(AppError::AlreadyUnlocked),
    }
}

/// POST /api/v1/sessions/{id}/messages - Run one round-trip.
///
/// The round-trip runs on its own task so a dropped connection cannot leave
/// the session stuck awaiting a reply.
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<SnapshotResponse, AppError> {
    let start = Instant::now();
    let widget = find_session(&state, &id)?;
    let mut guard = widget
        .try_lock_owned()
        .map_err(|_| AppError::Chat(ChatError::ReplyPending))?;

    let (outcome, snapshot) = tokio::spawn(async move {
        let outcome = guard.send_message(&body.text).await;
        let snapshot = guard.snapshot();
        (outcome, snapshot)
    })
    .await
    .map_err(|e| AppError::Internal(format!("round-trip task failed: {e}")))?;

    match outcome? {
        SendOutcome::Failed(_) => {
            tracing::debug!(session_id = %id, "Round-trip answered with the error reply");
        }
        SendOutcome::Replied(_) | SendOutcome::Ignored => {}
    }
    Ok(Json(ApiResponse::success(snapshot, start)))
}

/// DELETE /api/v1/sessions/{id} - Flush pending writes and close.
pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ClosedSession>>, AppError> {
    let start = Instant::now();
    let uuid = parse_uuid(&id)?;
    let widget = state
        .sessions
        .close(&uuid)
        .ok_or_else(|| AppError::SessionNotFound(id.clone()))?;

    let flushed = widget.lock().await.flush_persistence().await;
    tracing::info!(session_id = %uuid, flushed = flushed.len(), "Session closed over HTTP");
    Ok(Json(ApiResponse::success(
        ClosedSession {
            id: uuid,
            pending_writes: flushed.len(),
        },
        start,
    )))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use talentchat_core::chat::repository::BoxTranscriptRepository;
    use talentchat_infra::config::Secrets;
    use talentchat_infra::rest::RestTranscriptRepository;
    use talentchat_types::config::WidgetConfig;
    use tower::ServiceExt; // oneshot
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::http::router::build_router;

    fn test_app(endpoint_url: String) -> (Router, AppState) {
        test_app_with_store(endpoint_url, None)
    }

    fn test_app_with_store(
        endpoint_url: String,
        transcripts: Option<Arc<BoxTranscriptRepository>>,
    ) -> (Router, AppState) {
        let secrets = Secrets {
            api_key: SecretString::from("test-key"),
            store_key: None,
        };
        let client = Arc::new(HttpInferenceClient::new(endpoint_url, secrets.api_key.clone()));
        let state = AppState::from_parts(
            WidgetConfig::default(),
            secrets,
            std::env::temp_dir(),
            client,
            transcripts,
        );
        (build_router(state.clone()), state)
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let req = match body {
            Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn open(app: &Router) -> String {
        let (status, body) = call(app, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["unlocked"], false);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_full_conversation_flow() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "5 years"})))
            .expect(1)
            .mount(&server)
            .await;
        let (app, _) = test_app(format!("{}/api/chat", server.uri()));

        let id = open(&app).await;

        let (status, body) = call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/intake"),
            Some(json!({"name": "Ana", "email": "ana@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["unlocked"], true);
        assert_eq!(body["data"]["messages"].as_array().unwrap().len(), 1);

        let (status, body) = call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/messages"),
            Some(json!({"text": "What is your experience?"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let messages = body["data"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1], json!({"role": "user", "text": "What is your experience?"}));
        assert_eq!(messages[2], json!({"role": "assistant", "text": "5 years"}));
        assert_eq!(body["data"]["awaiting_reply"], false);
    }

    #[tokio::test]
    async fn test_invalid_intake_returns_422() {
        let (app, _) = test_app(String::new());
        let id = open(&app).await;

        let (status, body) = call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/intake"),
            Some(json!({"name": "", "email": "ana@"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["field"], "name");
        assert_eq!(errors[1]["code"], "EMAIL_INVALID");

        let (_, body) = call(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(body["data"]["unlocked"], false);
        assert_eq!(body["data"]["show_errors"], true);
    }

    #[tokio::test]
    async fn test_message_before_intake_is_forbidden() {
        let (app, _) = test_app(String::new());
        let id = open(&app).await;

        let (status, body) = call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/messages"),
            Some(json!({"text": "hello"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["errors"][0]["code"], "CHAT_LOCKED");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_yields_error_reply() {
        let (app, _) = test_app(String::new());
        let id = open(&app).await;
        call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/intake"),
            Some(json!({"name": "Ana", "email": "ana@example.com"})),
        )
        .await;

        let (status, body) = call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/messages"),
            Some(json!({"text": "hello?"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let messages = body["data"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2]["text"], "Hubo un error al procesar tu pregunta.");
    }

    #[tokio::test]
    async fn test_blank_message_returns_unchanged_snapshot() {
        let (app, _) = test_app(String::new());
        let id = open(&app).await;
        call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/intake"),
            Some(json!({"name": "Ana", "email": "ana@example.com"})),
        )
        .await;

        let (status, body) = call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/messages"),
            Some(json!({"text": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_send_conflicts() {
        let (app, state) = test_app(String::new());
        let id = open(&app).await;
        let widget = state.sessions.get(&id.parse().unwrap()).unwrap();
        let _held = widget.lock().await;

        let (status, body) = call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/messages"),
            Some(json!({"text": "hello"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["errors"][0]["code"], "REPLY_PENDING");
    }

    #[tokio::test]
    async fn test_visitor_draft_and_locale() {
        let (app, _) = test_app(String::new());
        let (_, body) = call(&app, "POST", "/api/v1/sessions?locale=en", None).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = call(
            &app,
            "PUT",
            &format!("/api/v1/sessions/{id}/visitor"),
            Some(json!({"name": "Ana"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["draft"]["name"], "Ana");
        assert_eq!(body["data"]["draft"]["email"], "");
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_ids() {
        let (app, _) = test_app(String::new());
        let (status, _) = call(&app, "GET", "/api/v1/sessions/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let missing = Uuid::now_v7();
        let (status, body) = call(&app, "GET", &format!("/api/v1/sessions/{missing}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"][0]["code"], "SESSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_close_session() {
        let (app, state) = test_app(String::new());
        let id = open(&app).await;
        assert_eq!(state.sessions.len(), 1);

        let (status, body) = call(&app, "DELETE", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["pending_writes"], 0);
        assert!(state.sessions.is_empty());

        let (status, _) = call(&app, "DELETE", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = test_app(String::new());
        let (status, body) = call(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_replies_do_not_wait_on_slow_transcript_store() {
        let inference = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "ok"})))
            .mount(&inference)
            .await;

        let write_delay = Duration::from_millis(1500);
        let store = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/chats"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!([{"id": 42}]))
                    .set_delay(write_delay),
            )
            .expect(1)
            .mount(&store)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/chats"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&store)
            .await;

        let repo = RestTranscriptRepository::new(store.uri(), "chats", SecretString::from("k"));
        let (app, state) = test_app_with_store(
            format!("{}/api/chat", inference.uri()),
            Some(Arc::new(BoxTranscriptRepository::new(repo))),
        );
        let id = open(&app).await;
        call(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/intake"),
            Some(json!({"name": "Ana", "email": "ana@example.com"})),
        )
        .await;

        let started = Instant::now();
        for text in ["one", "two"] {
            let (status, _) = call(
                &app,
                "POST",
                &format!("/api/v1/sessions/{id}/messages"),
                Some(json!({"text": text})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        let (_, body) = call(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert!(started.elapsed() < write_delay / 2);
        assert_eq!(body["data"]["messages"].as_array().unwrap().len(), 5);
        assert!(body["data"]["transcript_id"].is_null());

        // Closing flushes both writes; the handle is then known.
        let widget = state.sessions.get(&id.parse().unwrap()).unwrap();
        let outcomes = widget.lock().await.flush_persistence().await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(
            widget.lock().await.session_handle().map(|h| h.to_string()),
            Some("42".to_string())
        );
    }
}
