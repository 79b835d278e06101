//! BUSHIDO FORGE Gateway — POST /analyze behind the strike ledger.
//! Single public endpoint; the upstream token stays backend-only and the
//! client always receives HTTP 200 with a schema-valid result.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forge_core::{
    AnalyzeRequest, AnalyzeResult, ForgeConfig, GatewayOrchestrator, UNIDENTIFIED_CLIENT,
};

#[derive(Clone)]
struct AppState {
    orchestrator: Arc<GatewayOrchestrator>,
}

#[tokio::main]
async fn main() {
    // Load .env first. The upstream token stays in the backend environment;
    // the frontend is a stateless client and must never receive or send it.
    if let Err(e) = dotenvy::dotenv() {
        eprintln!(
            "[forge-gateway] .env not loaded: {} (using system environment)",
            e
        );
    }
    if std::env::var("BUSHIGO_TOKEN").is_err() {
        eprintln!(
            "[forge-gateway] Hint: Set BUSHIGO_TOKEN in .env for live refinement; the gateway holds the token, clients never see it."
        );
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ForgeConfig::from_env();
    if config.token.is_none() {
        tracing::warn!(
            target: "forge::gateway",
            "BUSHIGO_TOKEN missing, every request will degrade to the no-token result"
        );
    }
    let port = config.port;
    let state = AppState {
        orchestrator: Arc::new(GatewayOrchestrator::from_config(&config)),
    };

    let app = build_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(target: "forge::gateway", %addr, version = forge_core::version(), "forge gateway listening");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}

fn build_app(state: AppState) -> Router {
    // Browser clients call from arbitrary origins; the ledger, not CORS, is
    // the abuse control.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze_handler))
        .with_state(state)
        .layer(cors)
}

async fn health() -> &'static str {
    "OK"
}

/// POST /analyze: resolve the client key, run the pipeline, and answer 200
/// whatever happened. Degradation is encoded in the body, never the status.
async fn analyze_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<AnalyzeRequest>,
) -> Json<AnalyzeResult> {
    let client = client_key(&headers, Some(addr));
    Json(state.orchestrator.analyze(&client, &body).await)
}

/// Ledger key for one request: first `X-Forwarded-For` hop if present, else
/// the peer address, else the shared unidentified pool.
fn client_key(headers: &HeaderMap, addr: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| addr.map(|a| a.ip().to_string()))
        .unwrap_or_else(|| UNIDENTIFIED_CLIENT.to_string())
}
