use std::sync::Arc;

use tracing::{debug, info};

use crate::connection::{Connection, ConnectionDescriptor};
use crate::driver::Driver;
use crate::driver::path::DriverPath;
use crate::error::TdvqError;
use crate::limit::{self, LimitStrategy};
use crate::materialize::{self, QueryResult};
use crate::schema::{self, SchemaDescription};
use crate::verbose::Timer;

pub const TEST_CONNECTION_SQL: &str = "SELECT 'success' AS test_connection";

/// Runs queries against TDV, one connection per request.
#[derive(Clone)]
pub struct Executor {
    driver: Arc<dyn Driver>,
    driver_path: DriverPath,
    strategies: Vec<LimitStrategy>,
    default_max_rows: Option<i64>,
}

impl Executor {
    pub fn new(
        driver: Arc<dyn Driver>,
        driver_path: DriverPath,
        strategies: Vec<LimitStrategy>,
        default_max_rows: Option<i64>,
    ) -> Self {
        Self {
            driver,
            driver_path,
            strategies,
            default_max_rows,
        }
    }

    /// Run `query`, returning at most the resolved row cap.
    pub async fn run_query(
        &self,
        query: &str,
        descriptor: &ConnectionDescriptor,
    ) -> Result<QueryResult, TdvqError> {
        let max_rows = materialize::resolve_max_rows(descriptor.max_rows, self.default_max_rows);
        self.spawn(query.to_string(), descriptor.clone(), max_rows, true)
            .await
    }

    /// Probe the connection with a trivial query.
    pub async fn test_connection(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<QueryResult, TdvqError> {
        self.run_query(TEST_CONNECTION_SQL, descriptor).await
    }

    /// Read the datasource's tables and columns from the system catalog.
    pub async fn get_schema(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<SchemaDescription, TdvqError> {
        let sql = schema::schema_query(&descriptor.database);
        let result = self.spawn(sql, descriptor.clone(), None, false).await?;
        schema::format_schema(&result)
    }

    /// The blocking pipeline: connect, rewrite, execute, materialize,
    /// disconnect. The connection is closed on every exit path.
    pub fn run_blocking(
        &self,
        query: &str,
        descriptor: &ConnectionDescriptor,
        max_rows: Option<usize>,
        rewrite: bool,
    ) -> Result<QueryResult, TdvqError> {
        let timer = Timer::start();
        let sql = match max_rows {
            Some(n) if rewrite => limit::rewrite(query, &self.strategies, n as u64 + 1),
            _ => query.to_string(),
        };
        if sql != query {
            debug!(sql = %sql, "query rewritten");
        }

        let mut conn = Connection::new(self.driver.as_ref(), &self.driver_path, descriptor);
        conn.connect()?;

        let result = conn
            .execute(&sql)
            .and_then(|driver_result| materialize::materialize(driver_result, max_rows));
        conn.disconnect();

        let result = result?;
        info!(
            rows = result.rows.len(),
            incomplete = result.incomplete,
            elapsed_ms = timer.elapsed_ms() as u64,
            "query complete"
        );
        Ok(result)
    }

    async fn spawn(
        &self,
        sql: String,
        descriptor: ConnectionDescriptor,
        max_rows: Option<usize>,
        rewrite: bool,
    ) -> Result<QueryResult, TdvqError> {
        // odbc-api handles are not Send, so the whole request runs on one blocking thread.
        let executor = self.clone();
        tokio::task::spawn_blocking(move || {
            executor.run_blocking(&sql, &descriptor, max_rows, rewrite)
        })
        .await
        .map_err(|e| TdvqError::Driver {
            message: format!("task join error: {}", e),
        })?
    }
}
