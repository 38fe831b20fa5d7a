use std::path::{Path, PathBuf};

use crate::error::TdvqError;

/// Location of the native TDV ODBC driver library.
///
/// Resolved once at startup and handed to every connection; it never changes
/// for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverPath(PathBuf);

impl DriverPath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Resolve the driver for the platform this binary runs on.
    pub fn for_host(driver_dir: &Path) -> Result<Self, TdvqError> {
        Self::resolve(driver_dir, std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Resolve `<driver_dir>/<platform>/<library>` for an OS/arch pair.
    pub fn resolve(driver_dir: &Path, os: &str, arch: &str) -> Result<Self, TdvqError> {
        let (platform, library) = match (os, arch) {
            ("linux", "x86_64") => ("linux-x64", "libtdvodbc.so"),
            ("linux", "aarch64") => ("linux-arm64", "libtdvodbc.so"),
            ("macos", "x86_64") => ("darwin-x64", "libtdvodbc.dylib"),
            ("macos", "aarch64") => ("darwin-arm64", "libtdvodbc.dylib"),
            ("windows", "x86_64") => ("win32-x64", "tdvodbc.dll"),
            _ => {
                return Err(TdvqError::Configuration {
                    message: format!(
                        "no TDV ODBC driver available for {}/{}; set driver_path explicitly",
                        os, arch
                    ),
                });
            }
        };
        Ok(Self(driver_dir.join(platform).join(library)))
    }
}
