//! transfer_client library: an HTTP transfer layer with explicit redirect
//! handling and per-attempt diagnostics.
//!
//! A [`RequestExecutor`] prepares GET or POST requests (query strings,
//! URL-encoded bodies, multipart uploads), performs them through a
//! [`Transport`], follows 301/302 redirects up to a configurable cap and
//! returns an immutable [`Response`] with case-insensitive, folded headers.
//! Selected [`MetadataKey`]s are collected for every attempt. Several
//! executors can be run together through a [`TransferPool`].
//!
//! # Example
//!
//! ```no_run
//! use transfer_client::{MetadataKey, Params, ReqwestTransport, RequestExecutor, TransportOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut executor = RequestExecutor::new(None, ReqwestTransport::new(), TransportOptions::default());
//! executor.prepare_post(
//!     "https://example.com/api/items",
//!     Some(Params::form([("name", "widget"), ("qty", "3")])),
//!     &[("Accept", "application/json")],
//! )?;
//!
//! let response = executor.execute(&[MetadataKey::TotalTime, MetadataKey::PrimaryIp]).await;
//! if response.has_error() {
//!     eprintln!("transfer failed: {}", response.error());
//! } else {
//!     println!("{} {}", response.http_code(), response.body_text());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Executors are async and require a Tokio runtime.

#![warn(missing_docs)]

pub mod config;
pub mod error_handling;
pub mod executor;
pub mod initialization;
pub mod metadata;
pub mod pool;
pub mod response;
pub mod transport;

// Re-export public API
pub use config::{LogFormat, LogLevel, OptionOverrides, RequestLimits, TransportOptions};
pub use error_handling::{InitializationError, OutputError, TransferError, TransferErrorKind};
pub use executor::{FileUpload, FormField, ParamValue, Params, RequestExecutor};
pub use metadata::{MetaValue, MetadataKey, RequestMetadata, TransferInfo};
pub use pool::TransferPool;
pub use response::{FieldValue, Headers, Response};
pub use transport::{
    HandleStrategy, HttpMethod, PreparedRequest, RequestBody, ReqwestTransport, Transfer,
    Transport,
};
