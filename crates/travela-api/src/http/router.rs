//! Axum router configuration with middleware.
//!
//! Middleware: CORS (origins from `allowed_hosts`), request tracing, panic
//! recovery.

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.allowed_hosts);

    Router::new()
        // Auth
        .route("/auth/request-otp", post(handlers::auth::request_otp))
        .route("/auth/verify-otp", post(handlers::auth::verify_otp))
        // Agent
        .route("/ask", post(handlers::ask::ask))
        // Conversations
        .route("/chats", get(handlers::chats::list_conversations))
        .route(
            "/chats/{id}",
            get(handlers::chats::get_conversation).put(handlers::chats::update_conversation),
        )
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

/// CORS layer for the configured origins. `*` anywhere in the list allows
/// any origin; unparseable entries are skipped.
fn cors_layer(allowed_hosts: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_hosts.iter().any(|h| h.trim() == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_hosts
        .iter()
        .filter_map(|host| match HeaderValue::from_str(host.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %host, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    use travela_core::agent::box_provider::BoxAgentProvider;
    use travela_core::agent::provider::AgentProvider;
    use travela_infra::sqlite::pool::DatabasePool;
    use travela_types::agent::{AgentReply, AgentRequest};
    use travela_types::config::Settings;
    use travela_types::error::AgentError;

    /// Replies with a fixed text, or nothing when `reply` is `None`.
    struct StubProvider {
        reply: Option<String>,
        calls: Arc<Mutex<usize>>,
    }

    impl AgentProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        fn model(&self) -> &str {
            "stub-model"
        }

        async fn complete(&self, _request: &AgentRequest) -> Result<AgentReply, AgentError> {
            *self.calls.lock().unwrap() += 1;
            Ok(AgentReply {
                text: self.reply.clone(),
                model: "stub-model".to_string(),
            })
        }
    }

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    async fn test_app(reply: Option<&str>) -> (Router, Arc<Mutex<usize>>) {
        let calls = Arc::new(Mutex::new(0));
        let provider = StubProvider {
            reply: reply.map(str::to_string),
            calls: calls.clone(),
        };
        let state = AppState::with_provider(
            Settings::default(),
            test_pool().await,
            BoxAgentProvider::new(provider),
        )
        .unwrap();
        (build_router(state), calls)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn verify_request(phone: &str, code: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/auth/verify-otp")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!(
                "grant_type=password&username={}&password={code}",
                phone.replace('+', "%2B")
            )))
            .unwrap()
    }

    /// Request an OTP in development mode and exchange it for a token.
    async fn login(app: &Router, phone: &str) -> String {
        let (status, body) = send(
            app,
            json_request("POST", "/auth/request-otp", None, json!({ "phone": phone })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let message = body["message"].as_str().unwrap();
        assert!(message.starts_with("OTP sent in development mode"));
        let code = message.split_whitespace().last().unwrap();
        assert_eq!(code.len(), 6);

        let (status, body) = send(app, verify_request(phone, code)).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["token_type"], "bearer");
        body["access_token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _) = test_app(Some("hi")).await;
        let (status, body) = send(&app, get_request("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_login_ask_and_history_flow() {
        let (app, calls) = test_app(Some("June to October is the dry season.")).await;
        let token = login(&app, "0712345678").await;

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/ask",
                Some(&token),
                json!({ "question": "best time to visit Nairobi?" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["question"], "best time to visit Nairobi?");
        assert_eq!(body["answer"], "June to October is the dry season.");
        let conversation_id = body["conversation_id"].as_str().unwrap().to_string();
        assert!(!conversation_id.is_empty());

        // Follow-up lands in the same conversation.
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/ask",
                Some(&token),
                json!({ "question": "and Mombasa?", "conversation_id": conversation_id }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["conversation_id"], conversation_id.as_str());
        assert_eq!(*calls.lock().unwrap(), 2);

        let (status, body) = send(&app, get_request("/chats", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["id"], conversation_id.as_str());
        let messages = list[0]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["question"], "best time to visit Nairobi?");
        assert_eq!(messages[1]["question"], "and Mombasa?");

        let (status, body) = send(
            &app,
            json_request(
                "PUT",
                &format!("/chats/{conversation_id}"),
                Some(&token),
                json!({ "title": "Kenya trip" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["title"], "Kenya trip");
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);

        let (status, body) = send(
            &app,
            get_request(&format!("/chats/{conversation_id}"), Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Kenya trip");
    }

    #[tokio::test]
    async fn test_code_cannot_be_reused() {
        let (app, _) = test_app(Some("ok")).await;
        let (_, body) = send(
            &app,
            json_request("POST", "/auth/request-otp", None, json!({ "phone": "0712345678" })),
        )
        .await;
        let code = body["message"]
            .as_str()
            .unwrap()
            .split_whitespace()
            .last()
            .unwrap()
            .to_string();

        let (status, _) = send(&app, verify_request("+254712345678", &code)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, verify_request("+254712345678", &code)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Invalid OTP");
        assert_eq!(body["code"], "INVALID_OTP");
    }

    #[tokio::test]
    async fn test_rate_limited_after_max_attempts() {
        let (app, _) = test_app(Some("ok")).await;
        for _ in 0..3 {
            let (status, _) = send(
                &app,
                json_request("POST", "/auth/request-otp", None, json!({ "phone": "0700000001" })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, body) = send(
            &app,
            json_request("POST", "/auth/request-otp", None, json!({ "phone": "0700000001" })),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["code"], "RATE_LIMITED");
    }

    #[tokio::test]
    async fn test_invalid_phone_is_bad_request() {
        let (app, _) = test_app(Some("ok")).await;
        let (status, body) = send(
            &app,
            json_request("POST", "/auth/request-otp", None, json!({ "phone": "not a phone" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_question_is_saved_as_submitted() {
        let (app, calls) = test_app(Some("Try Lamu.")).await;
        let token = login(&app, "0755555555").await;

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/ask",
                Some(&token),
                json!({ "question": "  quiet beaches?\n" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["question"], "  quiet beaches?\n");

        let (_, body) = send(&app, get_request("/chats", Some(&token))).await;
        assert_eq!(body[0]["messages"][0]["question"], "  quiet beaches?\n");

        let (status, body) = send(
            &app,
            json_request("POST", "/ask", Some(&token), json!({ "question": " \t " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_format() {
        let (app, _) = test_app(Some("ok")).await;
        let (status, body) = send(
            &app,
            json_request("POST", "/auth/request-otp", None, json!({ "number": "0712345678" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let request = Request::builder()
            .method("POST")
            .uri("/auth/verify-otp")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=0712345678"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let (app, _) = test_app(Some("ok")).await;
        let response = app
            .clone()
            .oneshot(get_request("/chats", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );

        let (status, body) = send(&app, get_request("/chats", Some("not-a-jwt"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let (status, _) = send(
            &app,
            json_request("POST", "/ask", None, json!({ "question": "hello?" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_foreign_conversation_is_not_found() {
        let (app, calls) = test_app(Some("Try Zanzibar.")).await;
        let alice = login(&app, "0711111111").await;
        let bob = login(&app, "0722222222").await;

        let (_, body) = send(
            &app,
            json_request("POST", "/ask", Some(&alice), json!({ "question": "beach ideas?" })),
        )
        .await;
        let conversation_id = body["conversation_id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            get_request(&format!("/chats/{conversation_id}"), Some(&bob)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "CONVERSATION_NOT_FOUND");

        let (status, _) = send(
            &app,
            json_request(
                "PUT",
                &format!("/chats/{conversation_id}"),
                Some(&bob),
                json!({ "title": "mine now" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/ask",
                Some(&bob),
                json!({ "question": "more?", "conversation_id": conversation_id }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        // Only Alice's question reached the agent.
        assert_eq!(*calls.lock().unwrap(), 1);

        let (status, body) = send(&app, get_request("/chats", Some(&bob))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_agent_reply_is_bad_gateway() {
        let (app, _) = test_app(None).await;
        let token = login(&app, "0733333333").await;

        let (status, body) = send(
            &app,
            json_request("POST", "/ask", Some(&token), json!({ "question": "anything?" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "AGENT_ERROR");

        // Nothing was saved.
        let (_, body) = send(&app, get_request("/chats", Some(&token))).await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_title_validation() {
        let (app, _) = test_app(Some("Sure.")).await;
        let token = login(&app, "0744444444").await;
        let (_, body) = send(
            &app,
            json_request("POST", "/ask", Some(&token), json!({ "question": "plan a safari" })),
        )
        .await;
        let conversation_id = body["conversation_id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            json_request(
                "PUT",
                &format!("/chats/{conversation_id}"),
                Some(&token),
                json!({ "title": "   " }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, _) = send(
            &app,
            json_request(
                "PUT",
                "/chats/does-not-exist",
                Some(&token),
                json!({ "title": "x" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_cors_layer_accepts_origin_lists() {
        let _ = cors_layer(&["*".to_string()]);
        let _ = cors_layer(&[
            "https://travela.app".to_string(),
            "bad\norigin".to_string(),
        ]);
    }
}
