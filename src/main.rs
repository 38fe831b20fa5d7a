use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tdvq::cli::{self, Cli, Command};
use tdvq::config::{self, AppConfig};
use tdvq::driver::odbc::OdbcDriver;
use tdvq::error::TdvqError;
use tdvq::format_detect::{self, OutputFormat};
use tdvq::{fields, format, masking, materialize, output, verbose, Executor};
use tracing::info;

#[tokio::main]
async fn main() {
    // Load .env file (optional, ignore if missing)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Query(ref args) => {
            query(args, cli.verbose, cli.show_secrets, cli.config.as_ref()).await
        }
        Command::TestConnection(ref args) => {
            test_connection(args, cli.verbose, cli.show_secrets, cli.config.as_ref()).await
        }
        Command::Schema(ref args) => {
            schema(args, cli.verbose, cli.show_secrets, cli.config.as_ref()).await
        }
        Command::Fields => list_fields(),
    };

    if let Err(err) = result {
        output::print_error(&err);
        process::exit(1);
    }
}

async fn query(
    args: &cli::QueryArgs,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&PathBuf>,
) -> Result<(), TdvqError> {
    let app_config = config::load_from_conn_args(&args.conn, verbose, show_secrets, config_path)?;
    verbose::init(app_config.verbose);
    let sql = resolve_sql(args)?;

    // Detect output format before query (fail-fast on bad extension)
    let format_info = detect_output(&app_config)?;

    let executor = build_executor(&app_config)?;
    let result = executor.run_query(&sql, &app_config.descriptor).await?;

    let max_rows = materialize::resolve_max_rows(
        app_config.descriptor.max_rows,
        app_config.default_max_rows,
    );
    output_result(&result, max_rows, format_info)
}

async fn test_connection(
    args: &cli::ConnArgs,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&PathBuf>,
) -> Result<(), TdvqError> {
    let app_config = config::load_from_conn_args(args, verbose, show_secrets, config_path)?;
    verbose::init(app_config.verbose);
    let executor = build_executor(&app_config)?;
    let result = executor.test_connection(&app_config.descriptor).await?;
    output_result(&result, None, detect_output(&app_config)?)
}

async fn schema(
    args: &cli::ConnArgs,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&PathBuf>,
) -> Result<(), TdvqError> {
    let app_config = config::load_from_conn_args(args, verbose, show_secrets, config_path)?;
    verbose::init(app_config.verbose);
    let format_info = detect_output(&app_config)?;
    let executor = build_executor(&app_config)?;
    let description = executor.get_schema(&app_config.descriptor).await?;

    match format_info {
        Some((OutputFormat::Json, path)) => output::write_file(&format::to_json(&description)?, &path),
        Some((OutputFormat::Toon, path)) => {
            output::write_file(&format::serialize_to_toon(&description)?, &path)
        }
        None => {
            output::print_result(&format::serialize_to_toon(&description)?);
            Ok(())
        }
    }
}

fn list_fields() -> Result<(), TdvqError> {
    output::print_result(&format::serialize_to_toon(&fields::CONNECTION_FIELDS)?);
    Ok(())
}

// --- Helpers ---

fn build_executor(app_config: &AppConfig) -> Result<Executor, TdvqError> {
    let descriptor = &app_config.descriptor;
    info!(
        host = descriptor.host(),
        domain = descriptor.domain(),
        datasource = %descriptor.database,
        username = descriptor.username.as_deref().unwrap_or("(none)"),
        password = %masking::format_optional_secret(descriptor.password.as_ref(), app_config.show_secrets),
        driver = %app_config.driver_path.as_path().display(),
        "connection settings"
    );

    let driver = OdbcDriver::new()?;
    Ok(Executor::new(
        Arc::new(driver),
        app_config.driver_path.clone(),
        app_config.limit_strategies.clone(),
        app_config.default_max_rows,
    ))
}

fn resolve_sql(args: &cli::QueryArgs) -> Result<String, TdvqError> {
    if let Some(ref sql) = args.sql {
        return Ok(sql.clone());
    }
    if let Some(ref path) = args.sql_file {
        let content = std::fs::read_to_string(path).map_err(|e| TdvqError::Configuration {
            message: format!("cannot read SQL file {}: {}", path.display(), e),
        })?;
        return Ok(content);
    }
    Err(TdvqError::Configuration {
        message: "no SQL provided; use positional argument or --file".to_string(),
    })
}

fn detect_output(app_config: &AppConfig) -> Result<Option<(OutputFormat, PathBuf)>, TdvqError> {
    app_config
        .output_file
        .as_ref()
        .map(|path| format_detect::detect_format(path))
        .transpose()
}

fn output_result(
    result: &tdvq::QueryResult,
    max_rows: Option<usize>,
    format_info: Option<(OutputFormat, PathBuf)>,
) -> Result<(), TdvqError> {
    let message = match max_rows {
        Some(n) if result.incomplete => Some(output::incomplete_message(n)),
        _ => None,
    };

    if let Some((format, path)) = format_info {
        info!(path = %path.display(), "writing output");
        let contents = match format {
            OutputFormat::Toon => format::to_toon(result)?,
            OutputFormat::Json => format::to_json(result)?,
        };
        output::write_file(&contents, &path)?;
        output::print_summary(result.rows.len(), &path, result.incomplete, message.as_deref())?;
    } else {
        output::print_result(&format::to_toon(result)?);
        if let Some(n) = max_rows
            && result.incomplete
        {
            output::print_incomplete_warning(n);
        }
    }

    Ok(())
}
