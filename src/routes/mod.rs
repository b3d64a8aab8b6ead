//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    let upload_limit = state.limits.max_upload_bytes() + MULTIPART_OVERHEAD;

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route(
            "/api/v1/resume",
            post(http::http_post_resume).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/profiles/:id", get(http::http_get_profile))
        .route("/api/v1/profiles/:id/fields", post(http::http_post_profile_field))
        .route(
            "/api/v1/candidates",
            get(http::http_list_candidates).post(http::http_post_candidate),
        )
        .route("/api/v1/candidates/:id", get(http::http_get_candidate))
        .route("/api/v1/candidates/:id/start", post(http::http_start_interview))
        .route("/api/v1/session", get(http::http_get_session))
        .route("/api/v1/session/draft", put(http::http_put_draft))
        .route("/api/v1/session/answer", post(http::http_post_answer))
        .route("/api/v1/session/pause", post(http::http_pause))
        .route("/api/v1/session/resume", post(http::http_resume))
        .route("/api/v1/session/abandon", post(http::http_abandon))
        .route("/api/v1/ui", get(http::http_get_ui).put(http::http_put_ui))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::AgentConfig;
    use crate::session::InterviewStore;

    fn app() -> Router {
        build_router(Arc::new(AppState::in_memory(AgentConfig::default(), InterviewStore::new())))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn create_candidate(app: &Router, name: &str, email: &str) -> String {
        let (status, body) = call(
            app,
            "POST",
            "/api/v1/candidates",
            Some(json!({ "name": name, "email": email, "phone": "555 123 4567" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "body {body}");
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = call(&app(), "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["openai"], false);
    }

    #[tokio::test]
    async fn interview_flow_over_http() {
        let app = app();
        let id = create_candidate(&app, "ada lovelace", "ada@engine.org").await;

        let (status, session) = call(&app, "POST", &format!("/api/v1/candidates/{id}/start"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["stage"], "in_progress");
        assert_eq!(session["candidateName"], "Ada Lovelace");
        assert_eq!(session["questionNumber"], 1);
        assert_eq!(session["timeRemaining"], 20);

        // Stale question id is a conflict and changes nothing.
        let (status, err) = call(
            &app,
            "POST",
            "/api/v1/session/answer",
            Some(json!({ "questionId": "q2", "text": "too early" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(err["error"]["code"], "STATE_MISMATCH");

        let mut question_id = session["question"]["id"].as_str().unwrap().to_string();
        for _ in 0..6 {
            let (status, out) = call(
                &app,
                "POST",
                "/api/v1/session/answer",
                Some(json!({ "questionId": question_id, "text": "an answer", "timeSpent": 4 })),
            )
            .await;
            assert_eq!(status, StatusCode::OK, "body {out}");
            if out["completed"] == true {
                break;
            }
            question_id = out["nextQuestion"]["id"].as_str().unwrap().to_string();
        }

        let (_, detail) = call(&app, "GET", &format!("/api/v1/candidates/{id}"), None).await;
        assert_eq!(detail["interviewStatus"], "completed");
        assert_eq!(detail["transcript"].as_array().unwrap().len(), 6);
        assert!(detail["finalScore"].is_u64());
        assert!(detail["summary"].is_string());
    }

    #[tokio::test]
    async fn pause_and_abandon_transitions() {
        let app = app();
        let id = create_candidate(&app, "Grace Hopper", "grace@navy.mil").await;

        let (status, _) = call(&app, "POST", "/api/v1/session/pause", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        call(&app, "POST", &format!("/api/v1/candidates/{id}/start"), None).await;
        let (status, session) = call(&app, "POST", "/api/v1/session/pause", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["paused"], true);

        let (status, _) = call(&app, "PUT", "/api/v1/session/draft", Some(json!({ "text": "x" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, session) = call(&app, "POST", "/api/v1/session/abandon", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["stage"], "idle");
        let (_, detail) = call(&app, "GET", &format!("/api/v1/candidates/{id}"), None).await;
        assert_eq!(detail["interviewStatus"], "paused");
    }

    #[tokio::test]
    async fn unknown_candidate_is_not_found() {
        let (status, body) = call(&app(), "POST", "/api/v1/candidates/nope/start", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn invalid_candidate_form_is_rejected() {
        let (status, body) = call(
            &app(),
            "POST",
            "/api/v1/candidates",
            Some(json!({ "name": "Ada", "email": "not-an-email", "phone": "5551234567" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn dashboard_search_filters_by_name_or_email() {
        let app = app();
        create_candidate(&app, "Ada Lovelace", "ada@engine.org").await;
        create_candidate(&app, "Grace Hopper", "grace@navy.mil").await;

        let (_, rows) = call(&app, "GET", "/api/v1/candidates?search=NAVY", None).await;
        let rows = rows.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Grace Hopper");

        let (_, rows) = call(&app, "GET", "/api/v1/candidates", None).await;
        assert_eq!(rows.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn resume_upload_walks_the_collector() {
        let app = app();
        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cv.txt\"\r\n\
             Content-Type: text/plain\r\n\r\nAda Lovelace\nAnalytical Engine Programmer\r\n--{boundary}--\r\n"
        );
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/resume")
                    .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let out: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(out["extracted"]["name"], "Ada Lovelace");
        assert_eq!(out["profile"]["status"], "awaiting_field");
        assert_eq!(out["profile"]["field"], "email");

        let draft_id = out["profile"]["draftId"].as_str().unwrap().to_string();
        let (_, draft) = call(&app, "GET", &format!("/api/v1/profiles/{draft_id}"), None).await;
        assert_eq!(draft["name"], "Ada Lovelace");
        assert!(draft["resumeText"].as_str().unwrap().contains("Analytical Engine"));
        let uri = format!("/api/v1/profiles/{draft_id}/fields");
        let (status, _) = call(&app, "POST", &uri, Some(json!({ "value": "nope" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (_, step) = call(&app, "POST", &uri, Some(json!({ "value": "ada@engine.org" }))).await;
        assert_eq!(step["field"], "phone");
        let (_, done) = call(&app, "POST", &uri, Some(json!({ "value": "+44 20 7946 0958" }))).await;
        assert_eq!(done["status"], "complete");
        assert_eq!(done["candidate"]["phone"], "442079460958");
    }

    #[tokio::test]
    async fn ui_preferences_round_trip() {
        let app = app();
        let (_, ui) = call(&app, "GET", "/api/v1/ui", None).await;
        assert_eq!(ui["activeTab"], "interviewee");
        let (_, ui) = call(&app, "PUT", "/api/v1/ui", Some(json!({ "activeTab": "interviewer" }))).await;
        assert_eq!(ui["activeTab"], "interviewer");
        assert_eq!(ui["showWelcomeBackModal"], false);
    }
}
