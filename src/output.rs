use crate::error::TdvqError;
use std::path::Path;

/// Print formatted output to stdout.
pub fn print_result(text: &str) {
    print!("{}", text);
}

/// Print error to stderr in the contract format: error: <category>: <message>
pub fn print_error(err: &TdvqError) {
    eprintln!("error: {}", err);
}

/// Warning text for a result cut off at `max_rows`.
pub fn incomplete_message(max_rows: usize) -> String {
    format!("result incomplete: showing first {} rows", max_rows)
}

/// Print an incomplete-result warning to stderr.
pub fn print_incomplete_warning(max_rows: usize) {
    eprintln!("warning: {}", incomplete_message(max_rows));
}

/// Build the file output summary as a TOON object with rows_written, file,
/// incomplete, and message (only when incomplete).
pub fn summary_toon(
    rows: usize,
    path: &Path,
    incomplete: bool,
    message: Option<&str>,
) -> Result<String, TdvqError> {
    let mut map = serde_json::Map::new();
    map.insert("rows_written".to_string(), serde_json::Value::from(rows));
    map.insert(
        "file".to_string(),
        serde_json::Value::String(path.display().to_string()),
    );
    map.insert("incomplete".to_string(), serde_json::Value::Bool(incomplete));
    if let Some(msg) = message {
        map.insert(
            "message".to_string(),
            serde_json::Value::String(msg.to_string()),
        );
    }

    toon_format::encode_default(&serde_json::Value::Object(map)).map_err(|e| TdvqError::Format {
        message: e.to_string(),
    })
}

/// Print the file output summary to stdout.
pub fn print_summary(
    rows: usize,
    path: &Path,
    incomplete: bool,
    message: Option<&str>,
) -> Result<(), TdvqError> {
    print!("{}", summary_toon(rows, path, incomplete, message)?);
    Ok(())
}

/// Write formatted output to a file.
pub fn write_file(contents: &str, path: &Path) -> Result<(), TdvqError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        return Err(TdvqError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("parent directory does not exist: {}", parent.display()),
        )));
    }
    std::fs::write(path, contents)?;
    Ok(())
}
