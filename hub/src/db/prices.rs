use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeSet;

use super::collections::{
    collection_name, find, find_one, list_collections_of_kind, symbol_from_collection,
    CollectionKind, Document, SortOrder,
};
use crate::error::ApiError;
use crate::series::{align, index_series, IndexedRow, Observation};
use crate::transform::{finite, round2};

// ── Types ────────────────────────────────────────────────────────────────

/// One stored trading day.  Every numeric field is optional: a value that is
/// missing or cannot be coerced is `None` and never rejects the document.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceObservation {
    pub symbol: String,
    pub date: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adjusted_close: Option<f64>,
    pub volume: Option<i64>,
}

impl PriceObservation {
    /// `None` when the document has no date.  The document's own `symbol`
    /// wins over the one derived from the collection name.
    fn from_document(doc: &Document, fallback_symbol: &str) -> Option<Self> {
        let date = doc.get_string("date")?;
        let symbol = doc
            .get_string("symbol")
            .unwrap_or_else(|| fallback_symbol.to_string())
            .to_uppercase();
        Some(Self {
            symbol,
            date,
            open: doc.get_f64("open"),
            high: doc.get_f64("high"),
            low: doc.get_f64("low"),
            close: doc.get_f64("close"),
            adjusted_close: doc.get_f64("adjusted_close"),
            volume: doc.get_i64("volume"),
        })
    }

    /// Adjusted close, falling back to close when the adjusted value is
    /// absent or zero.  Non-finite values count as absent.
    pub fn price(&self) -> Option<f64> {
        finite(self.adjusted_close)
            .filter(|p| *p != 0.0)
            .or(finite(self.close))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceVolumePoint {
    pub time: String,
    pub symbol: String,
    pub price: f64,
    pub volume: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub symbol: String,
    pub price: Option<f64>,
    pub change_pct: Option<f64>,
    pub volume: i64,
    pub high_52w: Option<f64>,
    pub low_52w: Option<f64>,
}

// ── Queries ──────────────────────────────────────────────────────────────

fn load_observations(
    conn: &Connection,
    collection: &str,
    projection: Option<&[&str]>,
    sort: Option<SortOrder>,
    limit: Option<u32>,
) -> Result<Vec<PriceObservation>, ApiError> {
    let fallback = symbol_from_collection(collection, CollectionKind::Prices).unwrap_or_default();
    Ok(find(conn, collection, projection, sort, limit)?
        .iter()
        .filter_map(|d| PriceObservation::from_document(d, &fallback))
        .collect())
}

/// Upper-cased symbols of every price collection, sorted and de-duplicated.
///
/// The symbol comes from the first document's `symbol` field; collections
/// that are empty or lack the field contribute nothing.
pub fn list_symbols(conn: &Connection) -> Result<Vec<String>, ApiError> {
    let mut symbols = BTreeSet::new();
    for col in list_collections_of_kind(conn, CollectionKind::Prices)? {
        if let Some(sym) = find_one(conn, &col, Some(&["symbol"]), None)?
            .and_then(|d| d.get_string("symbol"))
        {
            symbols.insert(sym.to_uppercase());
        }
    }
    Ok(symbols.into_iter().collect())
}

/// Daily price and volume for one symbol, oldest first.
pub fn price_volume(conn: &Connection, symbol: &str) -> Result<Vec<PriceVolumePoint>, ApiError> {
    let Some(col) = collection_name(symbol, CollectionKind::Prices) else {
        return Ok(Vec::new());
    };
    let sym = symbol.trim().to_uppercase();

    let points = load_observations(
        conn,
        &col,
        Some(&["date", "close", "adjusted_close", "volume"]),
        Some(SortOrder::Ascending),
        None,
    )?
    .into_iter()
    .filter_map(|o| {
        Some(PriceVolumePoint {
            price: o.price()?,
            time: o.date,
            symbol: sym.clone(),
            volume: o.volume.unwrap_or(0),
        })
    })
    .collect();
    Ok(points)
}

/// Base-100 indexed, EMA-smoothed prices for all symbols (or just `symbol`)
/// on a shared date axis.
pub fn indexed_prices(
    conn: &Connection,
    span: u32,
    symbol: Option<&str>,
) -> Result<Vec<IndexedRow>, ApiError> {
    let wanted = symbol
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty());

    let mut observations: Vec<Observation> = Vec::new();
    for col in list_collections_of_kind(conn, CollectionKind::Prices)? {
        for o in load_observations(conn, &col, None, None, None)? {
            if wanted.as_ref().is_some_and(|w| *w != o.symbol) {
                continue;
            }
            let Some(price) = o.price() else {
                continue;
            };
            observations.push(Observation {
                symbol: o.symbol,
                date: o.date,
                price,
            });
        }
    }

    let aligned = align(observations);
    if aligned.is_empty() {
        return Ok(Vec::new());
    }
    tracing::debug!(
        "indexing {} symbols over {} dates (span={span})",
        aligned.series.len(),
        aligned.dates.len()
    );
    Ok(index_series(&aligned, span))
}

/// Latest-day snapshot plus trailing `window`-session high/low.
///
/// `None` when the symbol has no stored days.
pub fn kpis(conn: &Connection, symbol: &str, window: u32) -> Result<Option<Kpis>, ApiError> {
    let Some(col) = collection_name(symbol, CollectionKind::Prices) else {
        return Ok(None);
    };

    let latest = load_observations(
        conn,
        &col,
        Some(&["date", "open", "high", "low", "close", "volume"]),
        Some(SortOrder::Descending),
        Some(1),
    )?;
    let Some(latest) = latest.into_iter().next() else {
        return Ok(None);
    };

    let open = finite(latest.open);
    let close = finite(latest.close);
    let change_pct = match (open, close) {
        (Some(o), Some(c)) if o != 0.0 => Some(round2((c - o) / o * 100.0)),
        _ => None,
    };

    let trailing = load_observations(
        conn,
        &col,
        Some(&["date", "high", "low"]),
        Some(SortOrder::Descending),
        Some(window),
    )?;
    let high_52w = trailing
        .iter()
        .filter_map(|o| finite(o.high))
        .reduce(f64::max)
        .map(round2);
    let low_52w = trailing
        .iter()
        .filter_map(|o| finite(o.low))
        .reduce(f64::min)
        .map(round2);

    Ok(Some(Kpis {
        symbol: symbol.trim().to_uppercase(),
        price: close.map(round2),
        change_pct,
        volume: latest.volume.unwrap_or(0),
        high_52w,
        low_52w,
    }))
}
