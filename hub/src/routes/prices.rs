use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::db::history::{self, HistoryPoint};
use crate::db::prices::{self, PriceVolumePoint};
use crate::error::ApiError;
use crate::series::IndexedRow;
use crate::state::AppState;

// ── Query params ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IndexedQuery {
    span: Option<u32>,
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SymbolQuery {
    symbol: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    symbols: String,
}

// ── Route definitions ────────────────────────────────────────────────────

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/symbols", get(api_symbols))
        .route("/api/prices", get(api_prices))
        .route("/api/price-volume", get(api_price_volume))
        .route("/api/kpis", get(api_kpis))
        .route("/api/history", get(api_history))
}

// ── Handlers ─────────────────────────────────────────────────────────────

async fn api_symbols(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(prices::list_symbols(&conn)?))
}

async fn api_prices(
    State(state): State<Arc<AppState>>,
    Query(q): Query<IndexedQuery>,
) -> Result<Json<Vec<IndexedRow>>, ApiError> {
    let span = q.span.unwrap_or(state.config.ema_span);
    if span == 0 {
        return Err(ApiError::BadRequest("span must be >= 1".to_string()));
    }
    let conn = state.conn()?;
    Ok(Json(prices::indexed_prices(&conn, span, q.symbol.as_deref())?))
}

async fn api_price_volume(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SymbolQuery>,
) -> Result<Json<Vec<PriceVolumePoint>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(prices::price_volume(&conn, &q.symbol)?))
}

/// Empty object when the symbol has no stored days.
async fn api_kpis(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SymbolQuery>,
) -> Result<Json<Value>, ApiError> {
    let conn = state.conn()?;
    let body = match prices::kpis(&conn, &q.symbol, state.config.kpi_window)? {
        Some(k) => json!(k),
        None => json!({}),
    };
    Ok(Json(body))
}

async fn api_history(
    State(state): State<Arc<AppState>>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryPoint>>, ApiError> {
    let symbols = history::parse_symbol_list(&q.symbols);
    if symbols.is_empty() {
        return Ok(Json(Vec::new()));
    }
    let conn = state.conn()?;
    Ok(Json(history::load_price_history(&conn, &symbols)?))
}
