use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::indicators::{self, RsiPoint, SmaPoint};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SymbolQuery {
    symbol: String,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/rsi", get(api_rsi))
        .route("/api/sma", get(api_sma))
}

async fn api_rsi(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SymbolQuery>,
) -> Result<Json<Vec<RsiPoint>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(indicators::rsi(&conn, &q.symbol)?))
}

async fn api_sma(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SymbolQuery>,
) -> Result<Json<Vec<SmaPoint>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(indicators::sma(&conn, &q.symbol)?))
}
