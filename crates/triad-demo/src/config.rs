//! Application configuration for the demo.

use std::path::PathBuf;

/// Runtime configuration for the Triad demo application.
///
/// Environment defaults, overridden by CLI flags where both exist.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory exports land in (`TRIAD_EXPORT_DIR`, default `.`).
    pub export_dir: PathBuf,
    /// Prefer a low-power GPU adapter (`TRIAD_LOW_POWER`).
    pub low_power: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            export_dir: std::env::var_os("TRIAD_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            low_power: std::env::var_os("TRIAD_LOW_POWER").is_some(),
        }
    }
}
