use thiserror::Error;

/// costwatch error types
#[derive(Error, Debug)]
pub enum CostwatchError {
    /// Failed to parse JSON input
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A billing source failed to produce entries
    #[error("source error: {0}")]
    Source(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Every billing source was tried and none produced entries
    #[error("no billing data available from any source (tried: {})", tried.join(", "))]
    EmptyInput { tried: Vec<String> },

    /// Entries were loaded but every one of them was rejected
    #[error("no usable cost records: all {rejected} entries were rejected")]
    NoUsableRecords { rejected: usize },
}

impl CostwatchError {
    /// Whether this error means the run had nothing to report on
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::EmptyInput { .. } | Self::NoUsableRecords { .. })
    }
}

/// Result type alias for costwatch
pub type Result<T> = std::result::Result<T, CostwatchError>;
