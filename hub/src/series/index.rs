use serde::Serialize;
use std::collections::BTreeMap;

use super::align::AlignedSeries;
use super::ema::smooth;
use crate::transform::round2;

/// One output row: `{"date": "...", "AAPL": 101.23, "MSFT": 98.7}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexedRow {
    pub date: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

/// Rebase so the first point is 100.
///
/// Returns `None` when the first value is zero or non-finite.
pub fn rebase(values: &[f64]) -> Option<Vec<f64>> {
    let base = *values.first()?;
    if base == 0.0 || !base.is_finite() {
        return None;
    }
    Some(values.iter().map(|v| v / base * 100.0).collect())
}

/// Smooth each aligned series with an EMA of `span`, rebase to 100 and
/// pivot into one row per axis date.
///
/// A symbol whose smoothed series cannot be rebased is left out.
pub fn index_series(aligned: &AlignedSeries, span: u32) -> Vec<IndexedRow> {
    let mut indexed: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (symbol, values) in &aligned.series {
        match rebase(&smooth(values, span)) {
            Some(rebased) => {
                indexed.insert(symbol.as_str(), rebased);
            }
            None => {
                tracing::warn!("{symbol}: first smoothed price is zero or non-finite, skipping");
            }
        }
    }

    if indexed.is_empty() {
        return Vec::new();
    }

    aligned
        .dates
        .iter()
        .enumerate()
        .map(|(i, date)| IndexedRow {
            date: date.clone(),
            values: indexed
                .iter()
                .map(|(sym, vals)| (sym.to_string(), round2(vals[i])))
                .collect(),
        })
        .collect()
}
