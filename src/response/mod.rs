//! HTTP response values and raw response parsing.
//!
//! A transport hands back the wire bytes of a response together with the
//! size of its header block. This module turns them into an immutable
//! [`Response`] with case-insensitive header lookup and folded repeated
//! headers.

mod parse;
mod types;


pub use parse::{parse_header_block, parse_response};
pub use types::{FieldValue, Headers, Response};
