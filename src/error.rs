//! Error types for pgdecode.

use thiserror::Error;

use crate::sqlstate::ServerMessage;

/// Result type for pgdecode operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Structured fields of a PostgreSQL error or notice response.
///
/// Severity, SQLSTATE code, and message are always present on the wire;
/// the remaining fields are optional. Numeric fields (`position`, `line`)
/// keep their wire text, decoding does not reinterpret them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorFields {
    /// Severity: ERROR, FATAL, PANIC, WARNING, NOTICE, DEBUG, INFO, LOG
    pub severity: String,
    /// SQLSTATE error code (5 characters)
    pub code: String,
    /// Primary error message
    pub message: String,
    /// Detailed error explanation
    pub detail: Option<String>,
    /// Suggestion for fixing the error
    pub hint: Option<String>,
    /// Cursor position in the query string (1-based)
    pub position: Option<String>,
    /// Cursor position in the failed internal command
    pub internal_position: Option<String>,
    /// Failed internal command text
    pub internal_query: Option<String>,
    /// Context/stack trace
    pub where_: Option<String>,
    /// Schema name
    pub schema: Option<String>,
    /// Table name
    pub table: Option<String>,
    /// Column name
    pub column: Option<String>,
    /// Data type name
    pub data_type: Option<String>,
    /// Constraint name
    pub constraint: Option<String>,
    /// Source file name
    pub file: Option<String>,
    /// Source line number
    pub line: Option<String>,
    /// Source routine name
    pub routine: Option<String>,
}

impl std::fmt::Display for ErrorFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} (SQLSTATE {})",
            self.severity, self.message, self.code
        )?;
        if let Some(detail) = &self.detail {
            write!(f, "\nDETAIL: {}", detail)?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\nHINT: {}", hint)?;
        }
        Ok(())
    }
}

/// Error type for pgdecode.
#[derive(Debug, Error)]
pub enum Error {
    /// Classified server error response
    #[error("PostgreSQL error: {0}")]
    Server(ServerMessage),

    /// Malformed message body (truncation, invalid UTF-8, unknown sentinel)
    #[error("Protocol error: {0}")]
    Packet(String),

    /// Required error/notice fields missing from the field stream
    #[error("Invalid error response: {}", .0.join(" "))]
    MissingErrorFields(Vec<String>),

    /// Message type byte with no registered decoder
    #[error("Unsupported backend message type: {}", .0.escape_ascii())]
    UnsupportedMessage(u8),
}

impl Error {
    /// Returns true if the error indicates the session is unusable.
    ///
    /// FATAL and PANIC server errors terminate the connection on the
    /// server side; every decode failure is conventionally fatal too.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Server(message) => {
                matches!(message.severity(), "FATAL" | "PANIC")
            }
            Error::Packet(_) | Error::MissingErrorFields(_) | Error::UnsupportedMessage(_) => true,
        }
    }

    /// Get the SQLSTATE code if this is a server error.
    pub fn sqlstate(&self) -> Option<&str> {
        match self {
            Error::Server(message) => Some(message.code()),
            _ => None,
        }
    }
}
