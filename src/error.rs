//! Failures that are allowed to stop the program.
//!
//! Everything else (unreadable text, unresolved fields, unparsable amounts)
//! degrades to empty text, `missing` or a zero contribution instead.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid {field} pattern '{pattern}': {source}")]
    Pattern {
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("tax table not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read tax table {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid tax table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("tax table {status}: {reason}")]
    Invalid { status: &'static str, reason: String },
}

/// Strict filing-status parse failure; `FilingStatus::parse_lossy` falls back to single.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filing status '{0}'")]
pub struct UnknownFilingStatus(pub String);
