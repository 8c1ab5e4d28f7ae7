use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "brdgen";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server-side upload cap. The web client rejects files over 500 MB before
/// submitting; the server enforces the same limit.
pub const MAX_UPLOAD_BYTES: usize = 500 * 1024 * 1024;

/// Default log filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    "brdgen=info,tower_http=warn".to_string()
}

/// Get the application data directory (~/brdgen/ on all platforms)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("brdgen")
}

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP API binds to.
    pub bind_addr: SocketAddr,
    /// Directory uploaded videos are staged in until processing finishes.
    pub uploads_dir: PathBuf,
    /// Directory rendered download files are written to.
    pub temp_dir: PathBuf,
    /// API key for the generative model. Without it every model call fails
    /// and the pipeline runs entirely on fallback content.
    pub gemini_api_key: Option<String>,
    /// Upper bound on simultaneously running pipelines.
    pub max_concurrent_pipelines: usize,
}

impl AppConfig {
    /// Resolve configuration from environment variables, falling back to
    /// defaults suitable for local use.
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BRDGEN_BIND")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| ([127, 0, 0, 1], 5000).into());

        let max_concurrent_pipelines = std::env::var("BRDGEN_MAX_PIPELINES")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&n| n > 0)
            .unwrap_or(4);

        Self {
            bind_addr,
            uploads_dir: app_data_dir().join("uploads"),
            temp_dir: app_data_dir().join("temp"),
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            max_concurrent_pipelines,
        }
    }

    /// Create the working directories if they do not exist yet.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.uploads_dir)?;
        std::fs::create_dir_all(&self.temp_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("brdgen"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn upload_cap_is_500_mb() {
        assert_eq!(MAX_UPLOAD_BYTES, 500 * 1024 * 1024);
    }

    #[test]
    fn ensure_dirs_creates_both() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig {
            bind_addr: ([127, 0, 0, 1], 0).into(),
            uploads_dir: tmp.path().join("uploads"),
            temp_dir: tmp.path().join("temp"),
            gemini_api_key: None,
            max_concurrent_pipelines: 4,
        };
        config.ensure_dirs().unwrap();
        assert!(config.uploads_dir.is_dir());
        assert!(config.temp_dir.is_dir());
    }
}
