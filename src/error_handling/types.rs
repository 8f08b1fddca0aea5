//! Error type definitions.
//!
//! Transfer failures are values carried on a `Response`; only setup and
//! file output failures are returned as `Err`.

use std::fmt;
use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use serde::Serialize;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Errors from writing a response body to disk.
#[derive(Error, Debug)]
pub enum OutputError {
    /// `execute` has not produced a response yet.
    #[error("No response available to write")]
    NoResponse,

    /// The parent directory could not be created.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The file could not be written.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// File that could not be written
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// Errors from parsing `name=value` request parameters and `Name: value` headers.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParamError {
    /// A parameter was not of the form `name=value`.
    #[error("Invalid parameter '{0}': expected name=value")]
    MissingEquals(String),

    /// A header was not of the form `Name: value`.
    #[error("Invalid header '{0}': expected 'Name: value'")]
    MissingColon(String),
}

/// Categories of transport failures.
///
/// Codes mirror the libcurl numbering where an equivalent exists so that
/// numbers read the same as in other tooling. `Other` covers everything the
/// transport cannot classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum TransferErrorKind {
    /// URL scheme is not http or https
    UnsupportedProtocol,
    /// URL could not be parsed
    UrlMalformed,
    /// Host name lookup failed
    CouldntResolveHost,
    /// TCP connection failed
    CouldntConnect,
    /// A local file to upload could not be read
    ReadError,
    /// Connect or total timeout elapsed
    OperationTimedOut,
    /// TLS handshake or certificate verification failed
    SslConnectError,
    /// Download stopped at the size limit
    AbortedByCallback,
    /// Transport-level redirect limit hit
    TooManyRedirects,
    /// Sending the request failed
    SendError,
    /// Receiving the response body failed
    RecvError,
    /// Response body could not be decoded
    BadContentEncoding,
    /// No request was prepared or no handle was open
    NotPerformed,
    /// Anything else
    Other,
}

impl TransferErrorKind {
    /// Numeric code reported as the `errno` half of the error pair.
    pub fn code(&self) -> u32 {
        match self {
            TransferErrorKind::UnsupportedProtocol => 1,
            TransferErrorKind::UrlMalformed => 3,
            TransferErrorKind::CouldntResolveHost => 6,
            TransferErrorKind::CouldntConnect => 7,
            TransferErrorKind::ReadError => 26,
            TransferErrorKind::OperationTimedOut => 28,
            TransferErrorKind::SslConnectError => 35,
            TransferErrorKind::AbortedByCallback => 42,
            TransferErrorKind::TooManyRedirects => 47,
            TransferErrorKind::SendError => 55,
            TransferErrorKind::RecvError => 56,
            TransferErrorKind::BadContentEncoding => 61,
            TransferErrorKind::NotPerformed => 90,
            TransferErrorKind::Other => 99,
        }
    }

    /// Short description used as a message prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferErrorKind::UnsupportedProtocol => "Unsupported protocol",
            TransferErrorKind::UrlMalformed => "URL using bad/illegal format",
            TransferErrorKind::CouldntResolveHost => "Could not resolve host",
            TransferErrorKind::CouldntConnect => "Could not connect to server",
            TransferErrorKind::ReadError => "Failed to read local data",
            TransferErrorKind::OperationTimedOut => "Operation timed out",
            TransferErrorKind::SslConnectError => "TLS connect error",
            TransferErrorKind::AbortedByCallback => "Transfer aborted",
            TransferErrorKind::TooManyRedirects => "Too many redirects",
            TransferErrorKind::SendError => "Failed sending data to the peer",
            TransferErrorKind::RecvError => "Failure when receiving data from the peer",
            TransferErrorKind::BadContentEncoding => "Unrecognized or bad content encoding",
            TransferErrorKind::NotPerformed => "No transfer was performed",
            TransferErrorKind::Other => "Transfer failed",
        }
    }
}

impl fmt::Display for TransferErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `(code, message)` pair reported by a transport for one transfer.
///
/// A transfer failed when *either* element is set: some transports leave
/// the code at zero on timeouts while still filling in the message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransferError {
    /// Numeric error code (0 = none)
    pub code: u32,
    /// Human-readable error message (empty = none)
    pub message: String,
}

impl TransferError {
    /// Creates an error pair from raw parts.
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Creates an error pair for `kind`, prefixing `detail` with the kind's description.
    pub fn from_kind(kind: TransferErrorKind, detail: impl fmt::Display) -> Self {
        Self::new(kind.code(), format!("{kind}: {detail}"))
    }

    /// Returns `true` if either the code or the message is set.
    pub fn has_error(&self) -> bool {
        self.code != 0 || !self.message.is_empty()
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}
