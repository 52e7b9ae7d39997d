//! Error types for govstore.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=cache, 3=not_found, 4=validation, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers
//!
//! Remote failures are absorbed by the hybrid facade and only show up here
//! when a caller talks to a remote adapter directly.

use thiserror::Error;

/// Result type alias for govstore operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Local cache (exit 2)
    CacheError,
    QuotaExceeded,

    // Not Found (exit 3)
    RecordNotFound,

    // Validation (exit 4)
    InvalidArgument,

    // Remote (exit 6)
    RemoteError,
    RemoteNotConfigured,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::CacheError => "CACHE_ERROR",
            Self::QuotaExceeded => "QUOTA_EXCEEDED",
            Self::RecordNotFound => "RECORD_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::RemoteError => "REMOTE_ERROR",
            Self::RemoteNotConfigured => "REMOTE_NOT_CONFIGURED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::CacheError | Self::QuotaExceeded => 2,
            Self::RecordNotFound => 3,
            Self::InvalidArgument => 4,
            Self::RemoteError | Self::RemoteNotConfigured => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether retrying the same call could succeed.
    ///
    /// True for transient remote failures and corrected input.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument | Self::RemoteError | Self::CacheError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in govstore operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cache database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Local cache error: {0}")]
    Cache(String),

    #[error("Local cache quota exceeded: need {needed} bytes, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("No record found in {table}")]
    NotFound { table: String },

    #[error("Remote request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote store returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Remote store is not configured")]
    RemoteNotConfigured,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Database(_) | Self::Cache(_) => ErrorCode::CacheError,
            Self::QuotaExceeded { .. } => ErrorCode::QuotaExceeded,
            Self::NotFound { .. } => ErrorCode::RecordNotFound,
            Self::Http(_) | Self::Remote { .. } => ErrorCode::RemoteError,
            Self::RemoteNotConfigured => ErrorCode::RemoteNotConfigured,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::QuotaExceeded { quota, .. } => Some(format!(
                "The local cache is capped at {quota} bytes. Raise `quota_bytes` in \
                 ~/.govstore/config.json or run `govstore clear <table>`."
            )),

            Self::NotFound { table } => Some(format!(
                "Nothing matched in '{table}'. Use `govstore select {table}` to see cached rows."
            )),

            Self::RemoteNotConfigured => Some(
                "Set GOVSTORE_REMOTE_URL and GOVSTORE_REMOTE_KEY, or add remote_url/remote_key \
                 to ~/.govstore/config.json"
                    .to_string(),
            ),

            Self::InvalidArgument(msg) => {
                if msg.contains("field=value") {
                    Some("Filters look like `--eq status=pending` or `--eq weight_kg=1000`".to_string())
                } else if msg.contains("JSON") {
                    Some("Records are JSON objects, e.g. '{\"miner_id\":\"m1\"}'".to_string())
                } else {
                    None
                }
            }

            Self::Database(_)
            | Self::Cache(_)
            | Self::Http(_)
            | Self::Remote { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
