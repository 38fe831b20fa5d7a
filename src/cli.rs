use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tdvq", about = "Row-capped queries against TDV data virtualization servers")]
pub struct Cli {
    /// Path to config file
    #[arg(short = 'c', long, global = true, env = "TDVQ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit diagnostics to stderr
    #[arg(short = 'v', long, global = true, env = "TDVQ_VERBOSE")]
    pub verbose: bool,

    /// Disable credential masking in diagnostics
    #[arg(long, global = true, env = "TDVQ_SHOW_SECRETS")]
    pub show_secrets: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a query and print at most --max-rows rows
    Query(QueryArgs),

    /// Check that a connection can be opened and queried
    #[command(name = "test-connection")]
    TestConnection(ConnArgs),

    /// Print the datasource's schemas, tables and columns
    Schema(ConnArgs),

    /// Print the connection form fields
    Fields,
}

#[derive(Parser, Debug)]
pub struct QueryArgs {
    /// SQL query text
    pub sql: Option<String>,

    /// Read SQL from file
    #[arg(short = 'f', long = "file", conflicts_with = "sql")]
    pub sql_file: Option<PathBuf>,

    #[command(flatten)]
    pub conn: ConnArgs,
}

#[derive(Args, Debug, Default)]
pub struct ConnArgs {
    /// TDV server hostname (default: localhost)
    #[arg(short = 'H', long, env = "TDVQ_HOST")]
    pub host: Option<String>,

    /// TDV ODBC port
    #[arg(long, env = "TDVQ_PORT")]
    pub port: Option<u16>,

    /// TDV domain (default: composite)
    #[arg(long, env = "TDVQ_DOMAIN")]
    pub domain: Option<String>,

    /// Datasource name
    #[arg(short = 'd', long, env = "TDVQ_DATABASE")]
    pub database: Option<String>,

    /// Username
    #[arg(short = 'u', long, env = "TDVQ_USERNAME")]
    pub username: Option<String>,

    /// Password
    #[arg(short = 'p', long, env = "TDVQ_PASSWORD")]
    pub password: Option<String>,

    /// Max rows to return for this connection (default: 10000)
    #[arg(short = 'm', long, env = "TDVQ_MAX_ROWS")]
    pub max_rows: Option<i64>,

    /// Disable the row cap
    #[arg(long)]
    pub no_limit: bool,

    /// Write results to file instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Config file profile name
    #[arg(short = 'P', long, env = "TDVQ_PROFILE")]
    pub profile: Option<String>,
}
