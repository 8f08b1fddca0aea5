//! Resource setup.
//!
//! This module provides:
//! - HTTP client construction from `TransportOptions`
//! - Logger initialization (plain or JSON)
//!
//! All initialization functions return `InitializationError` on failure.

mod client;
mod logger;

// Re-export public API
pub use client::init_client;
pub(crate) use client::init_client_with_resolver;
pub use logger::init_logger_with;
