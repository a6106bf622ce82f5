use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashSet;

use super::collections::{collection_name, find, CollectionKind, SortOrder};
use crate::error::ApiError;
use crate::transform::{finite, parse_calendar_date};

/// Close/volume history row for the dashboard charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub symbol: String,
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub close: f64,
    pub volume: i64,
}

/// Split `"aapl, MSFT,,aapl"` into `["AAPL", "MSFT"]`, keeping first-seen order.
pub fn parse_symbol_list(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// Close and volume history for several symbols, sorted by (symbol, date).
///
/// Symbols without a collection, or whose collection is empty, are skipped.
/// Rows with an unparseable date or no usable close are dropped; a missing
/// or unparseable volume becomes 0.
pub fn load_price_history(
    conn: &Connection,
    symbols: &[String],
) -> Result<Vec<HistoryPoint>, ApiError> {
    let mut out: Vec<HistoryPoint> = Vec::new();

    for sym in symbols {
        let Some(col) = collection_name(sym, CollectionKind::Prices) else {
            tracing::info!("no collection for {sym}");
            continue;
        };
        let docs = find(
            conn,
            &col,
            Some(&["date", "close", "volume"]),
            Some(SortOrder::Ascending),
            None,
        )?;
        if docs.is_empty() {
            tracing::info!("no price history for {sym} ({col})");
            continue;
        }

        let symbol = sym.trim().to_uppercase();
        out.extend(docs.iter().filter_map(|d| {
            let date = d.get_string("date").and_then(|s| parse_calendar_date(&s))?;
            let close = finite(d.get_f64("close"))?;
            Some(HistoryPoint {
                symbol: symbol.clone(),
                date: date.format("%Y-%m-%d").to_string(),
                close,
                volume: d.get_i64("volume").unwrap_or(0),
            })
        }));
    }

    out.sort_by(|a, b| (&a.symbol, &a.date).cmp(&(&b.symbol, &b.date)));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_symbol_list_dedupes_and_uppercases() {
        assert_eq!(
            parse_symbol_list(" aapl, MSFT,,aapl ,msft"),
            vec!["AAPL".to_string(), "MSFT".to_string()]
        );
        assert!(parse_symbol_list("").is_empty());
        assert!(parse_symbol_list(" , ").is_empty());
    }

    #[test]
    fn history_drops_bad_rows_and_sorts_by_symbol_then_date() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE msft_prices (date TEXT, close, volume);
             INSERT INTO msft_prices VALUES ('2024-01-03T00:00:00Z', 371.0, '900');
             INSERT INTO msft_prices VALUES ('2024-01-02', 370.0, 'n/a');
             INSERT INTO msft_prices VALUES ('not a date', 372.0, 1);
             INSERT INTO msft_prices VALUES ('2024-01-04', NULL, 1);
             CREATE TABLE aapl_prices (date TEXT, close, volume);
             INSERT INTO aapl_prices VALUES ('2024-01-02 00:00:00', 185.0, NULL);
             CREATE TABLE tsla_prices (date TEXT, close, volume);",
        )
        .unwrap();

        let symbols = parse_symbol_list("msft,tsla,nvda,aapl");
        let rows = load_price_history(&conn, &symbols).unwrap();
        assert_eq!(
            rows,
            vec![
                HistoryPoint {
                    symbol: "AAPL".into(),
                    date: "2024-01-02".into(),
                    close: 185.0,
                    volume: 0,
                },
                HistoryPoint {
                    symbol: "MSFT".into(),
                    date: "2024-01-02".into(),
                    close: 370.0,
                    volume: 0,
                },
                HistoryPoint {
                    symbol: "MSFT".into(),
                    date: "2024-01-03".into(),
                    close: 371.0,
                    volume: 900,
                },
            ]
        );
    }

    #[test]
    fn history_without_symbols_is_empty() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(load_price_history(&conn, &[]).unwrap().is_empty());
    }
}
