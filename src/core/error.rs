use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the updater core.
/// Every module returns `Result<T, UpdaterError>`.
#[derive(Debug, Error)]
pub enum UpdaterError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    /// Timeout, transport failure, 5xx or a payload we could not decode.
    /// Never retried here; the caller re-runs the whole operation.
    #[error("Registry unavailable at {url}: {reason}")]
    Unavailable { url: String, reason: String },

    // ── Serialization ───────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error in {path:?}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    // ── Configuration ───────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown source '{0}' (not present in source mappings)")]
    UnknownSource(String),

    #[error("Validation failed with {0} error(s)")]
    ValidationFailed(usize),
}

/// Convenience alias used throughout the crate.
pub type UpdaterResult<T> = Result<T, UpdaterError>;

impl From<std::io::Error> for UpdaterError {
    fn from(source: std::io::Error) -> Self {
        UpdaterError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl UpdaterError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        UpdaterError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn unavailable(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        UpdaterError::Unavailable {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
