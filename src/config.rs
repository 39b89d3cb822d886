//! Runtime configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the analytics backend.
    pub backend_url: String,
    /// Directory compiled reports are written to for local delivery.
    pub output_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `WIL_BACKEND_URL` (optional, default: `http://localhost:8088`)
    /// - `WIL_OUTPUT_DIR` (optional, default: `./reports`)
    pub fn from_env() -> Self {
        let backend_url =
            env::var("WIL_BACKEND_URL").unwrap_or_else(|_| "http://localhost:8088".to_string());
        let output_dir = env::var("WIL_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./reports"));
        Self {
            backend_url,
            output_dir,
        }
    }
}
