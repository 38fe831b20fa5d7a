use crate::cli::ConnArgs;
use crate::connection::ConnectionDescriptor;
use crate::driver::path::DriverPath;
use crate::error::TdvqError;
use crate::limit::{self, LimitStrategy};
use directories::ProjectDirs;
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

pub const DEFAULT_MAX_ROWS: i64 = 10_000;
pub const DEFAULT_LIMIT_STRATEGIES: &str = "fetch";

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub descriptor: ConnectionDescriptor,
    pub driver_path: DriverPath,
    pub limit_strategies: Vec<LimitStrategy>,
    /// Global row cap; `None` when `--no-limit` is given.
    pub default_max_rows: Option<i64>,
    pub verbose: bool,
    pub show_secrets: bool,
    pub output_file: Option<PathBuf>,
}

// --- TOML config file structs ---

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    #[serde(default)]
    defaults: TomlDefaults,
    #[serde(default)]
    profiles: HashMap<String, TomlProfile>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlDefaults {
    max_rows: Option<i64>,
    limit_strategies: Option<String>,
    driver_path: Option<PathBuf>,
    driver_dir: Option<PathBuf>,
    verbose: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
struct TomlProfile {
    host: Option<String>,
    port: Option<u16>,
    domain: Option<String>,
    database: Option<String>,
    username: Option<String>,
    password: Option<String>,
    password_env: Option<String>,
    max_rows: Option<i64>,
}

/// Config path resolution result; distinguishes explicit vs auto-resolved paths.
struct ResolvedConfigPath {
    path: PathBuf,
    /// true if user explicitly specified via --config or TDVQ_CONFIG
    explicit: bool,
}

/// Treat empty strings as absent.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Read an env var, treating unset and empty the same.
pub fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Resolve the config file path: --config flag > env var > platform default.
fn resolve_config_path(cli_config: Option<&PathBuf>) -> Option<ResolvedConfigPath> {
    if let Some(path) = cli_config {
        return Some(ResolvedConfigPath { path: path.clone(), explicit: true });
    }
    if let Some(path) = env_non_empty("TDVQ_CONFIG") {
        return Some(ResolvedConfigPath { path: PathBuf::from(path), explicit: true });
    }
    ProjectDirs::from("", "", "tdvq").map(|dirs| ResolvedConfigPath {
        path: dirs.config_dir().join("config.toml"),
        explicit: false,
    })
}

/// Load and parse the TOML config file (if it exists).
fn load_toml_config(resolved: Option<&ResolvedConfigPath>) -> Result<TomlConfig, TdvqError> {
    let resolved = match resolved {
        Some(r) => r,
        None => return Ok(TomlConfig::default()),
    };

    if !resolved.path.exists() {
        if resolved.explicit {
            return Err(TdvqError::Configuration {
                message: format!("config file not found: {}", resolved.path.display()),
            });
        }
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&resolved.path).map_err(|e| TdvqError::Configuration {
        message: format!("cannot read config file {}: {}", resolved.path.display(), e),
    })?;

    toml::from_str(&content).map_err(|e| TdvqError::Configuration {
        message: format!("invalid config file {}: {}", resolved.path.display(), e),
    })
}

/// Resolve a password from direct value, env indirection, or env var.
fn resolve_secret(
    direct: Option<&str>,
    env_key: Option<&str>,
    fallback_env: &str,
) -> Option<SecretString> {
    if let Some(val) = non_empty(direct) {
        return Some(SecretString::from(val.to_string()));
    }
    // Env indirection (e.g., password_env = "MY_SECRET")
    if let Some(val) = env_key.and_then(env_non_empty) {
        return Some(SecretString::from(val));
    }
    env_non_empty(fallback_env).map(SecretString::from)
}

/// Locate the driver library: explicit path > driver_dir lookup by platform.
fn resolve_driver_path(defaults: &TomlDefaults) -> Result<DriverPath, TdvqError> {
    if let Some(path) = env_non_empty("TDVQ_DRIVER_PATH") {
        return Ok(DriverPath::new(path));
    }
    if let Some(ref path) = defaults.driver_path {
        return Ok(DriverPath::new(path.clone()));
    }

    let driver_dir = env_non_empty("TDVQ_DRIVER_DIR")
        .map(PathBuf::from)
        .or_else(|| defaults.driver_dir.clone())
        .or_else(|| ProjectDirs::from("", "", "tdvq").map(|d| d.data_dir().join("drivers")))
        .unwrap_or_else(|| PathBuf::from("drivers"));

    DriverPath::for_host(&driver_dir)
}

/// Build AppConfig from connection CLI args.
pub fn load_from_conn_args(
    args: &ConnArgs,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&PathBuf>,
) -> Result<AppConfig, TdvqError> {
    let resolved_path = resolve_config_path(config_path);
    let toml_config = load_toml_config(resolved_path.as_ref())?;

    let profile = args
        .profile
        .as_ref()
        .map(|name| {
            toml_config.profiles.get(name).cloned().ok_or_else(|| TdvqError::Configuration {
                message: format!("profile '{}' not found in config file", name),
            })
        })
        .transpose()?
        .unwrap_or_default();

    let pick = |cli: Option<&String>, toml: Option<&String>| -> Option<String> {
        non_empty(cli.map(String::as_str))
            .or(non_empty(toml.map(String::as_str)))
            .map(str::to_string)
    };

    let database = pick(args.database.as_ref(), profile.database.as_ref()).ok_or_else(|| {
        TdvqError::Configuration {
            message: "no database specified; use --database or configure a profile".to_string(),
        }
    })?;

    let password = resolve_secret(
        args.password.as_deref(),
        profile.password_env.as_deref(),
        "TDVQ_PASSWORD",
    )
    .or_else(|| {
        non_empty(profile.password.as_deref()).map(|p| SecretString::from(p.to_string()))
    });

    // max_rows: --no-limit > CLI/ENV > profile; global default from TOML > 10000
    let (max_rows, default_max_rows) = if args.no_limit {
        (None, None)
    } else {
        (
            args.max_rows.or(profile.max_rows),
            Some(toml_config.defaults.max_rows.unwrap_or(DEFAULT_MAX_ROWS)),
        )
    };

    let descriptor = ConnectionDescriptor {
        host: pick(args.host.as_ref(), profile.host.as_ref()),
        port: args.port.or(profile.port),
        domain: pick(args.domain.as_ref(), profile.domain.as_ref()),
        database,
        username: pick(args.username.as_ref(), profile.username.as_ref()),
        password,
        max_rows,
    };

    let strategies_csv = env_non_empty("TDVQ_LIMIT_STRATEGIES")
        .or_else(|| toml_config.defaults.limit_strategies.clone())
        .unwrap_or_else(|| DEFAULT_LIMIT_STRATEGIES.to_string());
    let limit_strategies = limit::validate_strategies(&strategies_csv)?;

    let driver_path = resolve_driver_path(&toml_config.defaults)?;

    let verbose = verbose || toml_config.defaults.verbose.unwrap_or(false);

    Ok(AppConfig {
        descriptor,
        driver_path,
        limit_strategies,
        default_max_rows,
        verbose,
        show_secrets,
        output_file: args.output.clone(),
    })
}
