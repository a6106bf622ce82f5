use std::collections::{BTreeMap, BTreeSet};

/// One (symbol, date, price) observation pulled from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub symbol: String,
    pub date: String,
    pub price: f64,
}

/// Dense per-symbol arrays over a shared, sorted date axis.
///
/// Every array in `series` has exactly `dates.len()` values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedSeries {
    pub dates: Vec<String>,
    pub series: BTreeMap<String, Vec<f64>>,
}

impl AlignedSeries {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Build the union date axis and forward-fill each symbol onto it.
///
/// Symbols are upper-cased.  A repeated (symbol, date) keeps the last price
/// seen.  Axis dates before a symbol's first observation take that first
/// observation; later gaps carry the most recent value forward.
pub fn align<I>(observations: I) -> AlignedSeries
where
    I: IntoIterator<Item = Observation>,
{
    let mut by_symbol: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    let mut all_dates: BTreeSet<String> = BTreeSet::new();

    for obs in observations {
        all_dates.insert(obs.date.clone());
        by_symbol
            .entry(obs.symbol.to_uppercase())
            .or_default()
            .insert(obs.date, obs.price);
    }

    let dates: Vec<String> = all_dates.into_iter().collect();
    let mut series = BTreeMap::new();

    for (symbol, prices) in by_symbol {
        let Some(first) = prices.values().next().copied() else {
            continue;
        };
        let mut last = first;
        let dense: Vec<f64> = dates
            .iter()
            .map(|d| {
                if let Some(&p) = prices.get(d) {
                    last = p;
                }
                last
            })
            .collect();
        series.insert(symbol, dense);
    }

    AlignedSeries { dates, series }
}
