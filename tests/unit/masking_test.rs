use secrecy::SecretString;
use tdvq::masking::{format_optional_secret, format_secret, REDACTED};

#[test]
fn test_secret_masked_by_default() {
    let secret = SecretString::from("tdv-admin-password".to_string());
    let output = format_secret(&secret, false);
    assert_eq!(output, REDACTED);
    assert!(!output.contains("tdv-admin-password"));
}

#[test]
fn test_secret_exposed_with_show_secrets() {
    let secret = SecretString::from("tdv-admin-password".to_string());
    assert_eq!(format_secret(&secret, true), "tdv-admin-password");
}

#[test]
fn test_secret_debug_is_redacted() {
    let secret = SecretString::from("password123".to_string());
    let debug_output = format!("{:?}", secret);
    assert!(!debug_output.contains("password123"), "Debug should not expose secret: {}", debug_output);
}

#[test]
fn test_optional_secret_none() {
    assert_eq!(format_optional_secret(None, false), "(none)");
}

#[test]
fn test_optional_secret_empty_treated_as_none() {
    let secret = SecretString::from(String::new());
    assert_eq!(format_optional_secret(Some(&secret), true), "(none)");
}

#[test]
fn test_optional_secret_some_masked() {
    let secret = SecretString::from("s3cret".to_string());
    assert_eq!(format_optional_secret(Some(&secret), false), "[REDACTED]");
}

#[test]
fn test_optional_secret_some_exposed() {
    let secret = SecretString::from("s3cret".to_string());
    assert_eq!(format_optional_secret(Some(&secret), true), "s3cret");
}
