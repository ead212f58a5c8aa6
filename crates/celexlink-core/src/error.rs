use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rule {name:?} has an invalid pattern: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule {name:?} capture order must name \"year\" and \"number\" exactly once")]
    InvalidCaptureOrder { name: String },

    #[error("rule {name:?} capture order needs {wanted} groups but the pattern has {available}")]
    CaptureGroupOutOfRange {
        name: String,
        wanted: usize,
        available: usize,
    },
}
