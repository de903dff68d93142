//! HTTP routes: single-symbol JSON lookup and the HTML dashboard.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use tickboard_core::{QuoteError, Symbol};

use crate::render;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/api/:symbol", get(quote))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /api/{symbol}`: JSON summary for one caller-facing symbol.
///
/// Errors carry real status codes with a `{"error": ..}` body: 400 for an
/// unparseable ticker, 404 for an unknown symbol, 502 when the upstream is
/// unavailable or returns garbage.
async fn quote(State(state): State<AppState>, Path(symbol): Path<String>) -> Response {
    let symbol = match Symbol::parse(&symbol) {
        Ok(symbol) => symbol,
        Err(error) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response();
        }
    };

    match state.aggregator.lookup(&symbol).await {
        Ok(summary) => Json(summary).into_response(),
        Err(error) => {
            let status = match error {
                QuoteError::UnknownSymbol { .. } => StatusCode::NOT_FOUND,
                QuoteError::Unavailable { .. } | QuoteError::Malformed { .. } => {
                    StatusCode::BAD_GATEWAY
                }
            };
            (status, Json(json!({ "error": error.to_string() }))).into_response()
        }
    }
}

/// `GET /`: HTML dashboard over the configured regional basket.
///
/// Per-symbol cache entries are composed at render time, so one failed
/// symbol shows as a failed row without freezing the rest of the view.
async fn dashboard(State(state): State<AppState>) -> Html<String> {
    let entries = state.aggregator.aggregate(&state.basket_symbols).await;
    Html(render::dashboard_page(&state.world_indices, &entries))
}
