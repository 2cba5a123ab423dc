use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use meghai_core::{AnswerProvider, ConversationState};

use crate::logging::ConversationLogger;

/// Application state shared across routes: one conversation session per
/// server process.
///
/// The busy flag inside the state, not the mutex, is the reentrancy
/// guard: the lock is taken briefly to check-and-acquire and again to
/// settle, and is never held across the provider call. A second ask
/// arriving while one is in flight is rejected, not queued.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<ConversationState>>,
    pub provider: Arc<dyn AnswerProvider>,
    pub logger: Arc<Mutex<Option<ConversationLogger>>>,
}

/// Create router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/api/ask", post(ask))
        .route("/api/history", get(history))
        .route("/api/error/dismiss", post(dismiss_error))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// GET / - the single-page chat surface
async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /api/history - transcript plus the session flags
pub async fn history(State(state): State<AppState>) -> Json<serde_json::Value> {
    let session = state.session.lock().await;
    Json(serde_json::json!({
        "history": session.history(),
        "busy": session.is_busy(),
        "last_error": session.last_error(),
    }))
}

/// POST /api/ask - run one submit on the shared session
pub async fn ask(State(state): State<AppState>, Json(payload): Json<AskRequest>) -> Response {
    // Check-then-acquire happens under the lock in one synchronous step.
    let question = {
        let mut session = state.session.lock().await;
        session.set_draft(payload.question);
        session.begin_submit()
    };
    let Some(question) = question else {
        return (
            StatusCode::CONFLICT,
            Json(serde_json::json!({
                "error": "empty question, or a question is already in flight",
            })),
        )
            .into_response();
    };

    // The call runs in its own task: if the client disconnects, axum
    // drops this handler future, but the detached task still settles the
    // session. An abandoned request must not leave the busy flag held.
    let settled = tokio::spawn(drive_submit(state.clone(), question.clone()));

    match settled.await {
        Ok(Ok(answer)) => {
            Json(serde_json::json!({ "question": question, "answer": answer })).into_response()
        }
        Ok(Err(message)) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "error": message })),
        )
            .into_response(),
        Err(join_err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": join_err.to_string() })),
        )
            .into_response(),
    }
}

/// Call the provider and settle the session, detached from the request
/// lifetime. The lock is taken only to settle, never across the call;
/// the busy flag is released on every path.
async fn drive_submit(state: AppState, question: String) -> Result<String, String> {
    match state.provider.answer(&question).await {
        Ok(answer) => {
            state
                .session
                .lock()
                .await
                .settle_success(question.clone(), answer.clone());
            if let Some(logger) = state.logger.lock().await.as_mut() {
                logger.log_exchange(&question, &answer).await;
            }
            Ok(answer)
        }
        Err(err) => {
            let message = err.to_string();
            eprintln!("❌ Provider call failed: {}", message);
            state.session.lock().await.settle_failure(message.clone());
            if let Some(logger) = state.logger.lock().await.as_mut() {
                logger.log_failure(&question, &message).await;
            }
            Err(message)
        }
    }
}

/// POST /api/error/dismiss - clear the visible error notice
pub async fn dismiss_error(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.session.lock().await.dismiss_error();
    Json(serde_json::json!({ "ok": true }))
}

const INDEX_HTML: &str = include_str!("index.html");

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use meghai_core::ProviderError;
    use std::time::Duration;
    use tokio::sync::Notify;

    struct EchoProvider;

    #[async_trait]
    impl AnswerProvider for EchoProvider {
        async fn answer(&self, prompt: &str) -> Result<String, ProviderError> {
            Ok(format!("echo: {prompt}"))
        }
    }

    struct DownProvider;

    #[async_trait]
    impl AnswerProvider for DownProvider {
        async fn answer(&self, _prompt: &str) -> Result<String, ProviderError> {
            Err(ProviderError::Network("connection refused".into()))
        }
    }

    /// Blocks until released, standing in for a long provider call.
    struct GatedProvider {
        release: Arc<Notify>,
    }

    #[async_trait]
    impl AnswerProvider for GatedProvider {
        async fn answer(&self, prompt: &str) -> Result<String, ProviderError> {
            self.release.notified().await;
            Ok(format!("late: {prompt}"))
        }
    }

    fn app_state(provider: Arc<dyn AnswerProvider>) -> AppState {
        AppState {
            session: Arc::new(Mutex::new(ConversationState::new())),
            provider,
            logger: Arc::new(Mutex::new(None)),
        }
    }

    #[tokio::test]
    async fn ask_appends_an_exchange() {
        let state = app_state(Arc::new(EchoProvider));

        let response = ask(
            State(state.clone()),
            Json(AskRequest {
                question: "  hello  ".into(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let session = state.session.lock().await;
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].question, "hello");
        assert_eq!(session.history()[0].answer, "echo: hello");
        assert!(!session.is_busy());
        assert_eq!(session.draft(), "");
    }

    #[tokio::test]
    async fn blank_question_is_rejected() {
        let state = app_state(Arc::new(EchoProvider));

        let response = ask(
            State(state.clone()),
            Json(AskRequest {
                question: "   ".into(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(state.session.lock().await.history().is_empty());
    }

    #[tokio::test]
    async fn a_second_ask_while_busy_is_rejected() {
        let state = app_state(Arc::new(EchoProvider));

        // Simulate an in-flight call by acquiring the busy flag directly.
        {
            let mut session = state.session.lock().await;
            session.set_draft("first");
            session.begin_submit().unwrap();
        }

        let response = ask(
            State(state.clone()),
            Json(AskRequest {
                question: "second".into(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let session = state.session.lock().await;
        assert!(session.history().is_empty());
        assert!(session.is_busy());
    }

    #[tokio::test]
    async fn provider_failure_preserves_the_draft() {
        let state = app_state(Arc::new(DownProvider));

        let response = ask(
            State(state.clone()),
            Json(AskRequest {
                question: "will fail".into(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let session = state.session.lock().await;
        assert!(session.history().is_empty());
        assert_eq!(session.draft(), "will fail");
        assert!(!session.is_busy());
        assert!(session.last_error().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn disconnected_request_still_settles_the_session() {
        let release = Arc::new(Notify::new());
        let state = app_state(Arc::new(GatedProvider {
            release: release.clone(),
        }));

        let request = tokio::spawn(ask(
            State(state.clone()),
            Json(AskRequest {
                question: "patience".into(),
            }),
        ));

        // Wait for the submit to be accepted.
        for _ in 0..200 {
            if state.session.lock().await.is_busy() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(state.session.lock().await.is_busy());

        // Drop the handler future mid-flight, the way axum does when the
        // client goes away.
        request.abort();
        assert!(request.await.unwrap_err().is_cancelled());

        // The detached call finishes after the client is gone; the busy
        // flag must still be released and the exchange recorded.
        release.notify_one();
        for _ in 0..200 {
            if !state.session.lock().await.is_busy() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let mut session = state.session.lock().await;
        assert!(!session.is_busy());
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].answer, "late: patience");

        // A fresh submit is accepted again.
        session.set_draft("next");
        assert!(session.begin_submit().is_some());
    }

    #[tokio::test]
    async fn dismiss_clears_the_notice() {
        let state = app_state(Arc::new(DownProvider));
        ask(
            State(state.clone()),
            Json(AskRequest {
                question: "boom".into(),
            }),
        )
        .await;
        assert!(state.session.lock().await.last_error().is_some());

        dismiss_error(State(state.clone())).await;
        assert_eq!(state.session.lock().await.last_error(), None);
    }

    #[tokio::test]
    async fn history_reports_flags_and_transcript() {
        let state = app_state(Arc::new(EchoProvider));
        ask(
            State(state.clone()),
            Json(AskRequest {
                question: "one".into(),
            }),
        )
        .await;

        let Json(body) = history(State(state)).await;
        assert_eq!(body["busy"], false);
        assert_eq!(body["last_error"], serde_json::Value::Null);
        assert_eq!(body["history"][0]["question"], "one");
        assert_eq!(body["history"][0]["answer"], "echo: one");
    }
}
