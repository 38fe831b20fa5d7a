pub mod odbc;
pub mod path;

use thiserror::Error;

/// Metadata for a single result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    pub type_name: String,
}

/// A single cell value from a query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    Null,
}

/// A failure reported by the driver, before normalization.
///
/// Drivers may attach several diagnostic records to one failure; those are
/// kept in order as `Multi`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverFailure {
    #[error("{0}")]
    Single(String),
    #[error("{}", .0.join("; "))]
    Multi(Vec<String>),
}

/// Rows as the driver yields them. Each item is one row in column order.
pub type RowStream<'a> = Box<dyn Iterator<Item = Result<Vec<CellValue>, DriverFailure>> + 'a>;

/// What an executed statement produced.
pub enum DriverResult<'a> {
    Tabular {
        columns: Vec<ColumnMeta>,
        rows: RowStream<'a>,
    },
    /// DDL/DML and anything else without a result set.
    NonTabular,
}

/// A live session with the remote engine.
pub trait Session {
    fn execute(&mut self, sql: &str) -> Result<DriverResult<'_>, DriverFailure>;

    fn close(self: Box<Self>) -> Result<(), DriverFailure>;
}

/// Opens sessions from a driver connection string.
pub trait Driver: Send + Sync {
    fn connect(&self, connection_string: &str) -> Result<Box<dyn Session + '_>, DriverFailure>;
}
