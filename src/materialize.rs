use serde::Serialize;

use crate::driver::{CellValue, ColumnMeta, DriverResult};
use crate::error::TdvqError;
use crate::normalize;

/// A bounded query result as handed back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<CellValue>>,
    /// More rows existed than were returned.
    pub incomplete: bool,
}

impl QueryResult {
    /// Row `idx` as a column name → value map.
    pub fn record(&self, idx: usize) -> Option<serde_json::Map<String, serde_json::Value>> {
        let row = self.rows.get(idx)?;
        let mut map = serde_json::Map::new();
        for (i, col) in self.columns.iter().enumerate() {
            let value = match row.get(i).unwrap_or(&CellValue::Null) {
                CellValue::Text(s) => serde_json::Value::String(s.clone()),
                CellValue::Null => serde_json::Value::Null,
            };
            map.insert(col.name.clone(), value);
        }
        Some(map)
    }

    /// Cell at `idx` for a column matched case-insensitively.
    pub fn value(&self, idx: usize, column: &str) -> Option<&CellValue> {
        let col = self
            .columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(column))?;
        self.rows.get(idx)?.get(col)
    }
}

#[derive(Serialize)]
struct ResultJson {
    rows: Vec<serde_json::Map<String, serde_json::Value>>,
    incomplete: bool,
}

impl Serialize for QueryResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ResultJson {
            rows: (0..self.rows.len()).filter_map(|i| self.record(i)).collect(),
            incomplete: self.incomplete,
        }
        .serialize(serializer)
    }
}

/// Pick the effective row cap: a positive per-connection override wins,
/// then a positive global default, otherwise there is no cap.
pub fn resolve_max_rows(override_rows: Option<i64>, default_rows: Option<i64>) -> Option<usize> {
    override_rows
        .filter(|n| *n > 0)
        .or(default_rows.filter(|n| *n > 0))
        .and_then(|n| usize::try_from(n).ok())
}

/// Drain a driver result into a `QueryResult` holding at most `max_rows` rows.
///
/// Results without column metadata come back empty. A missing or zero cap
/// returns every row.
pub fn materialize(result: DriverResult<'_>, max_rows: Option<usize>) -> Result<QueryResult, TdvqError> {
    let (columns, stream) = match result {
        DriverResult::Tabular { columns, rows } if !columns.is_empty() => (columns, rows),
        _ => return Ok(QueryResult::default()),
    };

    let cap = max_rows.filter(|n| *n > 0);
    let mut rows = Vec::new();
    let mut incomplete = false;

    for item in stream {
        // Anything past the cap, even a failed fetch, only marks truncation.
        if let Some(cap) = cap
            && rows.len() >= cap
        {
            incomplete = true;
            break;
        }
        rows.push(item.map_err(normalize::query_error)?);
    }

    Ok(QueryResult {
        columns,
        rows,
        incomplete,
    })
}
