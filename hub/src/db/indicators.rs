use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;

use super::collections::{collection_name, find, CollectionKind, SortOrder};
use crate::error::ApiError;
use crate::transform::{finite, iso_midnight, round2};

pub const RSI_FIELD: &str = "rsi_14";
pub const SMA_FIELDS: [&str; 5] = ["sma_10", "sma_20", "sma_50", "sma_100", "sma_200"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsiPoint {
    pub time: String,
    pub rsi: f64,
}

/// SMA row; windows with no usable value are omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmaPoint {
    pub time: String,
    #[serde(flatten)]
    pub values: BTreeMap<&'static str, f64>,
}

/// Stored RSI(14) for a symbol, oldest first.  Missing, unparseable and
/// non-finite values drop the row.
pub fn rsi(conn: &Connection, symbol: &str) -> Result<Vec<RsiPoint>, ApiError> {
    let Some(col) = collection_name(symbol, CollectionKind::Rsi) else {
        return Ok(Vec::new());
    };

    let docs = find(
        conn,
        &col,
        Some(&["date", RSI_FIELD]),
        Some(SortOrder::Ascending),
        None,
    )?;

    Ok(docs
        .iter()
        .filter_map(|d| {
            let time = d.get_string("date")?;
            let rsi = finite(d.get_f64(RSI_FIELD))?;
            Some(RsiPoint {
                time,
                rsi: round2(rsi),
            })
        })
        .collect())
}

/// Stored SMAs for a symbol, oldest first, timestamped at midnight UTC.
/// A bad value only drops its own field; the row is kept.
pub fn sma(conn: &Connection, symbol: &str) -> Result<Vec<SmaPoint>, ApiError> {
    let Some(col) = collection_name(symbol, CollectionKind::Sma) else {
        return Ok(Vec::new());
    };

    let mut projection = vec!["date"];
    projection.extend(SMA_FIELDS);
    let docs = find(conn, &col, Some(projection.as_slice()), Some(SortOrder::Ascending), None)?;

    Ok(docs
        .iter()
        .filter_map(|d| {
            let date = d.get_string("date")?;
            let values = SMA_FIELDS
                .iter()
                .filter_map(|&key| finite(d.get_f64(key)).map(|v| (key, round2(v))))
                .collect();
            Some(SmaPoint {
                time: iso_midnight(&date),
                values,
            })
        })
        .collect())
}
