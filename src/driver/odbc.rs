use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};

use odbc_api::buffers::TextRowSet;
use odbc_api::{
    BlockCursor, ColumnDescription, Connection, ConnectionOptions, Cursor, Environment,
    ResultSetMetadata,
};

use crate::driver::{CellValue, ColumnMeta, Driver, DriverFailure, DriverResult, Session};
use crate::error::TdvqError;

const BATCH_SIZE: usize = 5000;
const MAX_TEXT_LEN: usize = 4096;

/// ODBC driver manager access for the TDV ODBC driver.
pub struct OdbcDriver {
    env: Environment,
}

impl OdbcDriver {
    pub fn new() -> Result<Self, TdvqError> {
        let env = Environment::new().map_err(|e| TdvqError::Connection {
            message: format!("ODBC environment error: {}", e),
        })?;
        Ok(Self { env })
    }
}

impl Driver for OdbcDriver {
    fn connect(&self, connection_string: &str) -> Result<Box<dyn Session + '_>, DriverFailure> {
        let conn = self
            .env
            .connect_with_connection_string(connection_string, ConnectionOptions::default())
            .map_err(odbc_failure)?;
        Ok(Box::new(OdbcSession { conn }))
    }
}

struct OdbcSession<'env> {
    conn: Connection<'env>,
}

impl Session for OdbcSession<'_> {
    fn execute(&mut self, sql: &str) -> Result<DriverResult<'_>, DriverFailure> {
        let Some(mut cursor) = self.conn.execute(sql, (), None).map_err(odbc_failure)? else {
            return Ok(DriverResult::NonTabular);
        };

        let num_cols = cursor.num_result_cols().map_err(odbc_failure)?;
        let num_cols = u16::try_from(num_cols).unwrap_or(0);

        let mut columns = Vec::with_capacity(num_cols as usize);
        for i in 1..=num_cols {
            let mut col_desc = ColumnDescription::default();
            cursor
                .describe_col(i, &mut col_desc)
                .map_err(odbc_failure)?;
            let name = col_desc.name_to_string().map_err(|e| {
                DriverFailure::Single(format!("failed to decode column name {}: {}", i, e))
            })?;
            columns.push(ColumnMeta {
                name,
                type_name: format!("{:?}", col_desc.data_type),
            });
        }

        if columns.is_empty() {
            return Ok(DriverResult::Tabular {
                columns,
                rows: Box::new(std::iter::empty()),
            });
        }

        let buffer = TextRowSet::for_cursor(BATCH_SIZE, &mut cursor, Some(MAX_TEXT_LEN))
            .map_err(odbc_failure)?;
        let block = cursor.bind_buffer(buffer).map_err(odbc_failure)?;

        Ok(DriverResult::Tabular {
            columns,
            rows: Box::new(OdbcRows {
                block,
                pending: VecDeque::new(),
                exhausted: false,
            }),
        })
    }

    fn close(self: Box<Self>) -> Result<(), DriverFailure> {
        // odbc-api disconnects on drop and panics if SQLDisconnect fails.
        let conn = self.conn;
        panic::catch_unwind(AssertUnwindSafe(move || drop(conn)))
            .map_err(|_| DriverFailure::Single("SQLDisconnect failed".to_string()))
    }
}

/// Streams rows out of a bound text buffer, one fetched batch at a time.
struct OdbcRows<C: Cursor> {
    block: BlockCursor<C, TextRowSet>,
    pending: VecDeque<Vec<CellValue>>,
    exhausted: bool,
}

impl<C: Cursor> Iterator for OdbcRows<C> {
    type Item = Result<Vec<CellValue>, DriverFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pending.is_empty() {
            if self.exhausted {
                return None;
            }
            match self.block.fetch() {
                Ok(Some(batch)) => {
                    for row_idx in 0..batch.num_rows() {
                        let row = (0..batch.num_cols())
                            .map(|col_idx| match batch.at(col_idx, row_idx) {
                                Some(bytes) => {
                                    CellValue::Text(String::from_utf8_lossy(bytes).into_owned())
                                }
                                None => CellValue::Null,
                            })
                            .collect();
                        self.pending.push_back(row);
                    }
                }
                Ok(None) => self.exhausted = true,
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(odbc_failure(e)));
                }
            }
        }
        self.pending.pop_front().map(Ok)
    }
}

/// odbc-api reports one diagnostic record per error; its text stays whole,
/// even when the driver spreads it over several lines.
fn odbc_failure(err: odbc_api::Error) -> DriverFailure {
    let text = match &err {
        odbc_api::Error::Diagnostics { record, .. } => record.to_string(),
        other => other.to_string(),
    };
    DriverFailure::Single(text.trim().to_string())
}
