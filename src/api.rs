//! REST API Server for the assistant router
//!
//! Exposes the routing pipeline via HTTP endpoints:
//! - `POST /chat` takes the request JSON and answers with the classification
//! - `POST /invoke` takes a whole gateway proxy event and answers with a proxy envelope
//! - `OPTIONS` preflight requests are acknowledged by the CORS layer

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::envelope::{self, error_body, extract_message, GatewayResponse};
use crate::pipeline::AssistantRouter;

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub router: Arc<AssistantRouter>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Chat Endpoint
/// =============================

/// Lenient body parsing: anything that is not JSON carries no message
fn parse_event(body: &Bytes) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

async fn chat_handler(State(state): State<ApiState>, body: Bytes) -> (StatusCode, Json<Value>) {
    let event = parse_event(&body);
    let message = extract_message(&event);
    info!(chars = message.chars().count(), "Received chat request");

    match state.router.handle_message(&message).await {
        Ok(result) => (StatusCode::OK, Json(serde_json::json!(result))),
        Err(e) => {
            info!(intent = e.intent_label(), error = %e, "Chat request rejected");
            (e.status_code(), Json(error_body(&e)))
        }
    }
}

/// =============================
/// Gateway Event Endpoint
/// =============================

async fn invoke_handler(State(state): State<ApiState>, body: Bytes) -> Json<GatewayResponse> {
    let event = parse_event(&body);

    if envelope::is_preflight(&event) {
        return Json(GatewayResponse::preflight());
    }

    let message = extract_message(&event);
    let outcome = state.router.handle_message(&message).await;
    let response = GatewayResponse::from_outcome(&outcome);
    info!(status = response.status_code, "Gateway event handled");

    Json(response)
}

/// =============================
/// Router
/// =============================

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE])
        .allow_methods([Method::OPTIONS, Method::POST])
}

pub fn create_router(router: Arc<AssistantRouter>) -> Router {
    let state = ApiState { router };

    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat_handler))
        .route("/invoke", post(invoke_handler))
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    router: Arc<AssistantRouter>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let app = create_router(router);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
