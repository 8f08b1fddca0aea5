//! Configuration constants.
//!
//! This module defines the defaults applied to every transport handle and
//! executor unless overridden, along with protocol constants used by the
//! redirect state machine.

use std::time::Duration;

/// Default User-Agent string for HTTP requests.
///
/// Identifies this crate and its version. Users can override it through
/// `OptionOverrides::user_agent` or the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str = concat!("transfer_client/", env!("CARGO_PKG_VERSION"));

// Network operation timeouts
/// Total transfer timeout (connect + send + receive)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(6);
/// TCP connection timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

// Redirect handling
/// Maximum number of redirect hops the executor follows before giving up
/// and returning the last response it received.
pub const DEFAULT_MAX_REDIRECTS: u32 = 5;

/// Status codes that make the executor re-issue the request.
pub const REDIRECT_STATUS_CODES: &[u16] = &[301, 302];

// Body handling
/// Maximum download size (0 = unlimited)
pub const DEFAULT_MAX_DOWNLOAD_SIZE: u64 = 0;
/// Receive buffer size hint (0 = let the transport decide)
pub const DEFAULT_BUFFER_SIZE: usize = 0;
/// Initial body buffer capacity when no buffer size hint is configured
pub const FALLBACK_BODY_CAPACITY: usize = 16 * 1024;

/// Name of the TLS backend reported in the `ssl_engines` metadata field.
pub const TLS_BACKEND: &str = "rustls";

/// Format used for the `file_time` metadata field.
pub const FILE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Content type sent with URL-encoded POST bodies.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
