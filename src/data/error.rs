use thiserror::Error;

/// Structural problems with a call-log source.
///
/// I/O and transport failures travel as `anyhow` context around these; use
/// `downcast_ref::<LoadError>()` to inspect the cause.
#[derive(Debug, Error, PartialEq)]
pub enum LoadError {
    #[error("required column '{0}' not found")]
    MissingColumn(String),

    /// `row` counts data rows from 1 (the header is not counted).
    #[error("row {row}: '{value}' is not a day/month/year date")]
    InvalidDate { row: usize, value: String },

    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedColumnType { column: String, data_type: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("HTTP {status} fetching {url}")]
    Http { status: u16, url: String },
}
