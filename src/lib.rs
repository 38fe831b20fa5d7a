//! Row-capped query execution against TDV data virtualization servers.
//!
//! A request opens one ODBC connection, rewrites the query to ask for one row
//! more than the cap, materializes at most the cap, and always closes the
//! connection before returning.

pub mod cli;
pub mod config;
pub mod connection;
pub mod driver;
pub mod error;
pub mod executor;
pub mod fields;
pub mod format;
pub mod format_detect;
pub mod limit;
pub mod masking;
pub mod materialize;
pub mod normalize;
pub mod output;
pub mod schema;
pub mod verbose;

pub use connection::{Connection, ConnectionDescriptor, ConnectionState};
pub use error::TdvqError;
pub use executor::Executor;
pub use materialize::QueryResult;
