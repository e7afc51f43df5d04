//! HTTP boundary for the news analytics pipeline.

pub mod config;
pub mod middleware;
pub mod news_routes;

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Duration;
use news_core::{
    Aggregate, KeywordCount, Lang, NewsProvider, NewsResult, NormalizedArticle, ResultMeta,
    SentimentLabel, TimelinePoint,
};
use news_pipeline::{Clock, NewsPipeline, SystemClock, TtlCache};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

pub use config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<NewsPipeline>,
    /// Providers in fetch order; empty when none is configured.
    pub providers: Arc<Vec<Arc<dyn NewsProvider>>>,
}

impl AppState {
    pub fn new(pipeline: NewsPipeline, providers: Vec<Arc<dyn NewsProvider>>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            providers: Arc::new(providers),
        }
    }

    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let lexicon = Arc::new(config.load_lexicon()?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let result_cache = Arc::new(TtlCache::new(
            "result",
            Duration::seconds(config.result_cache_ttl_secs),
            clock.clone(),
        ));
        let alias_cache = Arc::new(TtlCache::new(
            "alias",
            Duration::seconds(config.alias_cache_ttl_secs),
            clock.clone(),
        ));
        let pipeline = NewsPipeline::new(
            config.pipeline_config(),
            lexicon,
            result_cache,
            alias_cache,
            clock,
        );
        Ok(Self::new(pipeline, config.providers()))
    }
}

/// JSON envelope for non-news endpoints and all errors.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handler error: a status code plus the underlying cause.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn with_status(status: StatusCode, error: anyhow::Error) -> Self {
        Self { status, error }
    }

    pub fn not_configured(message: &str) -> Self {
        Self::with_status(StatusCode::NOT_IMPLEMENTED, anyhow::anyhow!(message.to_string()))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(error: E) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, error.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{}: {:#}", self.status, self.error);
        } else {
            tracing::warn!("{}: {}", self.status, self.error);
        }
        (self.status, Json(ApiResponse::<()>::error(self.error.to_string()))).into_response()
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub providers: Vec<String>,
    pub lexicon: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service liveness and configured providers")),
    tag = "System"
)]
async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::success(HealthStatus {
        status: "ok".to_string(),
        providers: state.providers.iter().map(|p| p.name().to_string()).collect(),
        lexicon: state.pipeline.lexicon().version.clone(),
    }))
}

#[derive(OpenApi)]
#[openapi(
    info(title = "News Lens API", description = "Query-aware news sentiment analytics"),
    paths(news_routes::get_news, health),
    components(schemas(
        NewsResult,
        NormalizedArticle,
        Aggregate,
        KeywordCount,
        TimelinePoint,
        ResultMeta,
        SentimentLabel,
        Lang,
        HealthStatus
    )),
    tags(
        (name = "News", description = "News analytics"),
        (name = "System", description = "Operational endpoints")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(news_routes::news_routes())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_id_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(axum::middleware::from_fn(middleware::response_headers_middleware)),
        )
        .with_state(state)
}

/// Install the global tracing subscriber. `RUST_LOG` sets the filter and
/// `RUST_LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    let state = AppState::from_config(&config)?;
    if state.providers.is_empty() {
        tracing::warn!("No news providers configured; /api/news will answer 501 until NEWSAPI_KEY or BING_NEWS_KEY is set");
    } else {
        let names: Vec<&str> = state.providers.iter().map(|p| p.name()).collect();
        tracing::info!("News providers: {}", names.join(", "));
    }

    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
