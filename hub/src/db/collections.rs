//! Document-store view of the SQLite database.
//!
//! A collection is a table, a document is a row and a field is a column.
//! Column types are not trusted; values are read dynamically and coerced by
//! the caller through [`crate::transform`].

use rusqlite::types::Value;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;

use crate::error::ApiError;
use crate::transform::{coerce_f64, coerce_i64, coerce_string};

/// Storage metadata, never returned to callers.
const ID_FIELD: &str = "_id";
const DATE_FIELD: &str = "date";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Prices,
    Rsi,
    Sma,
}

impl CollectionKind {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Prices => "_prices",
            Self::Rsi => "_rsi",
            Self::Sma => "_sma",
        }
    }
}

/// `AAPL` + prices ⇒ `aapl_prices`.
///
/// Returns `None` for symbols that cannot name a collection; callers treat
/// that exactly like a missing collection.
pub fn collection_name(symbol: &str, kind: CollectionKind) -> Option<String> {
    let sym = symbol.trim().to_ascii_lowercase();
    let valid = !sym.is_empty()
        && sym
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    valid.then(|| format!("{sym}{}", kind.suffix()))
}

/// `aapl_prices` ⇒ `AAPL`.
pub fn symbol_from_collection(name: &str, kind: CollectionKind) -> Option<String> {
    name.strip_suffix(kind.suffix())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_ascii_uppercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// One stored row with NULL fields dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(coerce_f64)
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(coerce_i64)
    }

    pub fn get_string(&self, field: &str) -> Option<String> {
        self.get(field).and_then(coerce_string)
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// List all collections (tables) in the store, sorted by name.
pub fn list_collection_names(conn: &Connection) -> Result<Vec<String>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
         ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Collections whose name ends with the given kind's suffix.
pub fn list_collections_of_kind(
    conn: &Connection,
    kind: CollectionKind,
) -> Result<Vec<String>, ApiError> {
    Ok(list_collection_names(conn)?
        .into_iter()
        .filter(|n| symbol_from_collection(n, kind).is_some())
        .collect())
}

/// Field names of a collection; empty when the collection does not exist.
fn collection_fields(conn: &Connection, collection: &str) -> Result<Vec<String>, ApiError> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
    let names = stmt
        .query_map(params![collection], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Read documents from a collection.
///
/// * `projection` — fields to return (`None` ⇒ all).  Fields the collection
///   does not have are absent from every document; `_id` is never returned.
/// * `sort` — order by `date`; ignored when the collection has no `date`.
///
/// A missing collection, or a projection that matches no field, yields an
/// empty Vec.
pub fn find(
    conn: &Connection,
    collection: &str,
    projection: Option<&[&str]>,
    sort: Option<SortOrder>,
    limit: Option<u32>,
) -> Result<Vec<Document>, ApiError> {
    let fields = collection_fields(conn, collection)?;
    if fields.is_empty() {
        tracing::debug!("collection {collection} not found");
        return Ok(Vec::new());
    }

    let selected: Vec<String> = fields
        .iter()
        .filter(|f| f.as_str() != ID_FIELD)
        .filter(|f| projection.is_none_or(|p| p.contains(&f.as_str())))
        .cloned()
        .collect();
    if selected.is_empty() {
        return Ok(Vec::new());
    }

    let column_list: Vec<String> = selected.iter().map(|f| quote_ident(f)).collect();
    let mut sql = format!(
        "SELECT {} FROM {}",
        column_list.join(", "),
        quote_ident(collection)
    );
    if let Some(order) = sort {
        if fields.iter().any(|f| f == DATE_FIELD) {
            sql.push_str(&format!(" ORDER BY {} {}", quote_ident(DATE_FIELD), order.sql()));
        }
    }
    if let Some(n) = limit {
        sql.push_str(&format!(" LIMIT {n}"));
    }

    let mut stmt = conn.prepare(&sql)?;
    let docs = stmt
        .query_map([], |row| {
            let mut doc = Document::default();
            for (i, name) in selected.iter().enumerate() {
                let value: Value = row.get(i)?;
                if value != Value::Null {
                    doc.fields.insert(name.clone(), value);
                }
            }
            Ok(doc)
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(docs)
}

/// First document of [`find`] with `limit = 1`.
pub fn find_one(
    conn: &Connection,
    collection: &str,
    projection: Option<&[&str]>,
    sort: Option<SortOrder>,
) -> Result<Option<Document>, ApiError> {
    Ok(find(conn, collection, projection, sort, Some(1))?
        .into_iter()
        .next())
}
