use secrecy::{ExposeSecret, SecretString};

pub const REDACTED: &str = "[REDACTED]";

/// Render a secret for diagnostics, masked unless `show_secrets` is set.
pub fn format_secret(secret: &SecretString, show_secrets: bool) -> String {
    if show_secrets {
        secret.expose_secret().to_string()
    } else {
        REDACTED.to_string()
    }
}

/// Like `format_secret`, with a placeholder for credential-less connections.
pub fn format_optional_secret(secret: Option<&SecretString>, show_secrets: bool) -> String {
    match secret {
        Some(s) if !s.expose_secret().is_empty() => format_secret(s, show_secrets),
        _ => "(none)".to_string(),
    }
}
