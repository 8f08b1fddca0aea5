//! Configuration and constants.
//!
//! This module provides:
//! - Default values (timeouts, user agent, redirect cap, etc.)
//! - Transport options, per-executor overrides and request limits
//! - CLI option types and parsing

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::Opt;
pub use constants::*;
pub use types::{LogFormat, LogLevel, OptionOverrides, RequestLimits, TransportOptions};
