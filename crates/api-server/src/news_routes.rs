//! News analytics endpoint.

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use news_core::{Lang, NewsRequest, NewsResult};
use serde::Deserialize;

use crate::{AppError, AppState};

pub const DEFAULT_QUERY: &str = "USDKRW";
pub const DEFAULT_DAYS: u32 = 3;
pub const MAX_DAYS: u32 = 14;
const NEWS_CACHE_CONTROL: &str = "public, max-age=60";

/// Query parameters for `/api/news`. Values are lenient: anything missing or
/// unparseable falls back to a default instead of failing the request.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NewsQuery {
    /// Search term (default: USDKRW)
    pub q: Option<String>,
    /// Look-back window in days, clamped to 1..=14 (default: 3)
    pub days: Option<String>,
    /// `en` or `kr` (default: kr)
    pub lang: Option<String>,
}

impl NewsQuery {
    pub fn into_request(self) -> NewsRequest {
        let query = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(DEFAULT_QUERY);

        let days = self
            .days
            .as_deref()
            .and_then(|d| d.trim().parse::<i64>().ok())
            .filter(|d| *d != 0)
            .map(|d| d.clamp(1, i64::from(MAX_DAYS)) as u32)
            .unwrap_or(DEFAULT_DAYS);

        NewsRequest::new(query, days, Lang::from_param(self.lang.as_deref()))
    }
}

pub fn news_routes() -> Router<AppState> {
    Router::new().route("/api/news", get(get_news))
}

#[utoipa::path(
    get,
    path = "/api/news",
    params(NewsQuery),
    responses(
        (status = 200, description = "Query-focused articles with aggregate sentiment", body = NewsResult),
        (status = 501, description = "No news provider configured")
    ),
    tag = "News"
)]
pub async fn get_news(
    State(state): State<AppState>,
    Query(params): Query<NewsQuery>,
) -> Result<Response, AppError> {
    let request = params.into_request();

    if let Some(hit) = state.pipeline.cached(&request) {
        return Ok(news_response(hit));
    }

    if state.providers.is_empty() {
        return Err(AppError::not_configured(
            "No news providers configured. Set NEWSAPI_KEY (or BING_NEWS_KEY).",
        ));
    }

    let result = state.pipeline.run(&request, &state.providers).await;
    tracing::info!(
        "News {}: {} articles, {} aliases",
        request.cache_key(),
        result.agg.count,
        result.meta.aliases.len()
    );
    Ok(news_response(result))
}

fn news_response(result: NewsResult) -> Response {
    let mut response = Json(result).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(NEWS_CACHE_CONTROL),
    );
    response
}
