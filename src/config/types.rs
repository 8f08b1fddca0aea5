//! Configuration types.
//!
//! This module defines the immutable option sets handed to executors and
//! transports, and the logging enums used by the CLI.

use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_BUFFER_SIZE, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_DOWNLOAD_SIZE,
    DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Options applied to a transport handle every time it is opened.
///
/// The `Default` value is the documented default configuration. Executors
/// receive their own copy at construction; nothing here is global state.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use transfer_client::config::TransportOptions;
///
/// let options = TransportOptions {
///     timeout: Duration::from_secs(30),
///     ..Default::default()
/// };
/// assert!(!options.verify_peer);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    /// Verify the peer's TLS certificate chain and host name
    pub verify_peer: bool,

    /// Total transfer timeout
    pub timeout: Duration,

    /// Connection establishment timeout
    pub connect_timeout: Duration,

    /// HTTP User-Agent header value
    pub user_agent: String,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            verify_peer: false,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl TransportOptions {
    /// Returns a copy of these options with every `Some` field of `overrides`
    /// taking precedence.
    pub fn merged(&self, overrides: &OptionOverrides) -> Self {
        Self {
            verify_peer: overrides.verify_peer.unwrap_or(self.verify_peer),
            timeout: overrides.timeout.unwrap_or(self.timeout),
            connect_timeout: overrides.connect_timeout.unwrap_or(self.connect_timeout),
            user_agent: overrides
                .user_agent
                .clone()
                .unwrap_or_else(|| self.user_agent.clone()),
        }
    }
}

/// Per-executor overrides for [`TransportOptions`]. `None` keeps the default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    /// Override for [`TransportOptions::verify_peer`]
    pub verify_peer: Option<bool>,
    /// Override for [`TransportOptions::timeout`]
    pub timeout: Option<Duration>,
    /// Override for [`TransportOptions::connect_timeout`]
    pub connect_timeout: Option<Duration>,
    /// Override for [`TransportOptions::user_agent`]
    pub user_agent: Option<String>,
}

/// Limits applied by an executor to every request it prepares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    /// Abort the download once this many bytes were received (0 = unlimited)
    pub max_download_size: u64,
    /// Receive buffer size hint passed to the transport (0 = transport default)
    pub buffer_size: usize,
    /// Maximum redirect hops followed by the executor
    pub max_redirects: u32,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_download_size: DEFAULT_MAX_DOWNLOAD_SIZE,
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}
