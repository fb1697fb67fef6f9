//! HTTP surface: `POST /api/translate` runs one relay, `GET /health` reports liveness.

use crate::logger::{snapshot, LogValue, Logger};
use crate::relay::RelayOrchestrator;
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::{header::USER_AGENT, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayOrchestrator>,
    pub logger: Logger,
}

#[derive(Debug, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<&'static str>,
}

/// JSON error response
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: message.into(),
                stage: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/translate", post(handle_translation))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `0.0.0.0:{port}` and serve until the process exits
pub async fn serve(port: u16, state: AppState) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("HTTP server error")
}

async fn health_check() -> &'static str {
    "OK"
}

async fn handle_translation(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<TranslationRequest>, JsonRejection>,
) -> Result<Json<crate::relay::RelayResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        state.logger.warn(
            "invalid translation request body",
            &[("error", rejection.body_text().into())],
        );
        ApiError::bad_request(rejection.body_text())
    })?;

    // Required field: reject the empty string before it reaches the relay.
    if request.text.is_empty() {
        state
            .logger
            .warn("invalid translation request", &[("error", "text is empty".into())]);
        return Err(ApiError::bad_request("text must not be empty"));
    }

    let client_ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default();
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let context = snapshot([
        ("client_ip", LogValue::from(client_ip)),
        ("user_agent", LogValue::from(user_agent)),
    ]);

    match state.relay.execute_with_context(&request.text, context).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => Err(ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                error: format!("translation error: {}", e),
                stage: Some(e.hop().as_str()),
            },
        }),
    }
}
