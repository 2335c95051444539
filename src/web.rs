use crate::engine::{RecommendError, RecommendService, UserQuery};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::signal;

#[derive(Clone)]
struct SharedState {
    service: Arc<RecommendService>,
}

async fn start_app(service: RecommendService, listen_addr: &str) {
    let shared_state = SharedState {
        service: Arc::new(service),
    };

    async fn shutdown_signal() {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }

    let app = Router::new()
        .route("/api/options", get(options))
        .route("/api/recommend", post(recommend))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(shared_state);

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .expect("failed to bind listen address");
    log::info!("listening on {listen_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

pub fn start_daemon(service: RecommendService, listen_addr: &str) {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
        .block_on(async { start_app(service, listen_addr).await });
}

// Make our own error that wraps `RecommendError`.
#[derive(Debug)]
struct HttpError(RecommendError);

// Tell axum how to convert `RecommendError` into a response.
impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.0 {
            RecommendError::NotReady(_) => axum::http::StatusCode::SERVICE_UNAVAILABLE,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, json!({"error": self.0.to_string()}).to_string()).into_response()
    }
}

/// GET /api/options: the choice lists for query building.
async fn options(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.service.options())
}

/// POST /api/recommend: run one query; absent fields default to empty.
/// Returns an array ordered by descending score, possibly empty, never
/// null.
async fn recommend(
    State(state): State<SharedState>,
    Json(query): Json<UserQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let results = state.service.recommend(&query).map_err(HttpError)?;
    Ok(Json(results))
}
