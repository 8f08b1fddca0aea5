//! Error handling.
//!
//! This module provides:
//! - Error type definitions (`thiserror` enums for setup and output failures)
//! - The transport error pair carried on every `Response`
//! - Categorization of transport library errors into stable numeric codes
//!
//! Transfer failures are never raised: they travel as a `(code, message)`
//! pair and callers check `Response::has_error()`.

mod categorization;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, error_chain_text, transfer_error_from_reqwest};
pub use types::{InitializationError, OutputError, ParamError, TransferError, TransferErrorKind};
