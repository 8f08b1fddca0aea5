//! The HTTP transport collaborator.
//!
//! A transport performs the network I/O for one prepared request and reports
//! the raw response bytes, the header block size, diagnostic fields and an
//! error pair. The executor configures and consumes it through the
//! [`Transport`] trait; [`ReqwestTransport`] is the bundled implementation.

mod reqwest_transport;
mod resolver;

use std::future::Future;

use clap::ValueEnum;
use strum_macros::Display;

use crate::config::TransportOptions;
use crate::error_handling::{InitializationError, TransferError, TransferErrorKind};
use crate::executor::FormField;
use crate::metadata::TransferInfo;

pub use reqwest_transport::ReqwestTransport;

/// HTTP method of a prepared request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, ValueEnum)]
pub enum HttpMethod {
    /// `GET`
    #[strum(serialize = "GET")]
    Get,
    /// `POST`
    #[strum(serialize = "POST")]
    Post,
}

/// How a transport treats its handle when a new request is prepared.
///
/// Executor logic is identical under both strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HandleStrategy {
    /// Keep the existing handle and reset its per-request state
    #[default]
    ResetInPlace,
    /// Drop the existing handle and create a new one
    Recreate,
}

/// Body of a prepared request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded` body built from form fields
    UrlEncoded(String),
    /// Caller-supplied body sent verbatim
    Raw(String),
    /// `multipart/form-data` body; file fields are read by the transport
    Multipart(Vec<FormField>),
}

/// A fully configured request, ready for a transport to perform.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// Request method
    pub method: HttpMethod,
    /// Target URL, including any query string
    pub url: String,
    /// Extra headers; empty means "send only the transport defaults"
    pub headers: Vec<(String, String)>,
    /// Request body
    pub body: RequestBody,
    /// Abort once this many body bytes were received (0 = unlimited)
    pub max_download_size: u64,
    /// Receive buffer size hint (0 = transport default)
    pub buffer_size: usize,
}

impl PreparedRequest {
    /// Creates a request without headers, body or limits.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: RequestBody::Empty,
            max_download_size: 0,
            buffer_size: 0,
        }
    }
}

/// Everything a transport reports about one performed request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transfer {
    /// Status line, header block and body exactly as received
    pub raw: Vec<u8>,
    /// Size of the status line plus header block within `raw`
    pub header_size: usize,
    /// Diagnostic fields
    pub info: TransferInfo,
    /// Error pair; empty on success
    pub error: TransferError,
}

impl Transfer {
    /// A transfer that produced no response at all.
    pub fn failed(url: impl Into<String>, error: TransferError) -> Self {
        Self {
            info: TransferInfo {
                effective_url: url.into(),
                ..Default::default()
            },
            error,
            ..Default::default()
        }
    }

    /// A transfer that was never started because no request was prepared.
    pub fn not_performed() -> Self {
        Self::failed(
            String::new(),
            TransferError::from_kind(TransferErrorKind::NotPerformed, "no request prepared"),
        )
    }
}

/// An HTTP engine the executor drives.
///
/// Implementations own their handle exclusively; it is released when the
/// transport is dropped.
pub trait Transport: Send {
    /// Creates or resets the handle and applies `options` to it.
    ///
    /// Called at the start of every prepare step.
    fn open(
        &mut self,
        options: &TransportOptions,
        strategy: HandleStrategy,
    ) -> Result<(), InitializationError>;

    /// Performs `request` and reports the outcome.
    ///
    /// Never fails: errors are reported in [`Transfer::error`].
    fn perform(&mut self, request: &PreparedRequest) -> impl Future<Output = Transfer> + Send;
}
