//! Request execution.
//!
//! A [`RequestExecutor`] drives one logical HTTP transaction: it prepares a
//! GET or POST on its transport, performs it, collects diagnostic metadata,
//! follows 301/302 redirects up to its configured cap, and hands back the
//! final [`Response`].
//!
//! ```text
//! Idle --prepare--> Sent --301/302--> Redirecting --re-prepare--> Sent ... --> Completed
//! ```

mod output;
mod params;


use std::time::Duration;

use log::{debug, warn};

use crate::config::{RequestLimits, TransportOptions, REDIRECT_STATUS_CODES};
use crate::error_handling::{InitializationError, TransferError, TransferErrorKind};
use crate::metadata::{collect_metadata, MetadataKey, RequestMetadata};
use crate::response::Response;
use crate::transport::{
    HandleStrategy, HttpMethod, PreparedRequest, RequestBody, Transfer, Transport,
};

pub use params::{FileUpload, FormField, ParamValue, Params};
pub(crate) use params::{append_query, encode_form};

/// Drives GET/POST requests, including redirects, over one transport handle.
///
/// Each executor owns its transport and metadata exclusively. The handle is
/// released when the executor is dropped.
///
/// # Examples
///
/// ```no_run
/// use transfer_client::{MetadataKey, Params, ReqwestTransport, RequestExecutor, TransportOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut executor = RequestExecutor::new(None, ReqwestTransport::new(), TransportOptions::default());
/// executor.prepare_get("http://example.com/search", Some(Params::form([("q", "rust")])), &[])?;
/// let response = executor.execute(&[MetadataKey::TotalTime]).await;
/// if !response.has_error() {
///     println!("{} -> {}", response.url(), response.http_code());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RequestExecutor<T: Transport> {
    id: Option<String>,
    transport: T,
    options: TransportOptions,
    strategy: HandleStrategy,
    limits: RequestLimits,
    method: HttpMethod,
    request: Option<PreparedRequest>,
    completed: Option<Transfer>,
    multi: bool,
    metadata: RequestMetadata,
    hop_metadata: Vec<RequestMetadata>,
    response: Option<Response>,
}

impl<T: Transport> RequestExecutor<T> {
    /// Creates an executor with its own copy of `options`.
    ///
    /// `id` is an optional caller-chosen label, used by [`crate::TransferPool`]
    /// to identify results.
    pub fn new(id: Option<String>, transport: T, options: TransportOptions) -> Self {
        Self {
            id,
            transport,
            options,
            strategy: HandleStrategy::default(),
            limits: RequestLimits::default(),
            method: HttpMethod::Get,
            request: None,
            completed: None,
            multi: false,
            metadata: RequestMetadata::new(),
            hop_metadata: Vec::new(),
            response: None,
        }
    }

    /// Sets how the transport handle is treated on each prepare step.
    pub fn with_strategy(mut self, strategy: HandleStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Replaces all request limits at once.
    pub fn with_limits(mut self, limits: RequestLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Caller-chosen label.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Options applied to the transport handle.
    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// Limits applied to prepared requests.
    pub fn limits(&self) -> RequestLimits {
        self.limits
    }

    /// Aborts downloads once `max_size` bytes were received (0 = unlimited).
    pub fn set_max_download_size(&mut self, max_size: u64) {
        self.limits.max_download_size = max_size;
    }

    /// Maximum number of redirect hops `execute` follows.
    pub fn set_max_redirect_count(&mut self, max_redirects: u32) {
        self.limits.max_redirects = max_redirects;
    }

    /// Receive buffer size hint passed to the transport (0 = transport default).
    pub fn set_buffer_size(&mut self, buffer_size: usize) {
        self.limits.buffer_size = buffer_size;
    }

    /// In multi mode `execute` consumes the transfer delivered by a batch
    /// driver instead of performing the request itself.
    pub fn set_multi(&mut self, multi: bool) {
        self.multi = multi;
    }

    /// Returns `true` if the executor is in multi mode.
    pub fn is_multi(&self) -> bool {
        self.multi
    }

    /// The request prepared by the last prepare step.
    pub fn prepared_request(&self) -> Option<&PreparedRequest> {
        self.request.as_ref()
    }

    /// Prepares a GET request.
    ///
    /// `params` are appended to the URL as a query string (form params are
    /// URL-encoded, encoded params are used verbatim). `headers` replace
    /// nothing when empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport handle cannot be created.
    pub fn prepare_get(
        &mut self,
        url: &str,
        params: Option<Params>,
        headers: &[(&str, &str)],
    ) -> Result<(), InitializationError> {
        self.open_handle()?;

        let url = match params {
            Some(params) => append_query(url, &params.to_query_string()),
            None => url.to_string(),
        };
        debug!("Prepared GET {url}");

        let mut request = self.base_request(HttpMethod::Get, url, headers);
        request.max_download_size = self.limits.max_download_size;
        request.buffer_size = self.limits.buffer_size;
        self.install(request);
        Ok(())
    }

    /// Prepares a POST request.
    ///
    /// Form params containing a [`FileUpload`] are sent as multipart form
    /// data, other form params as a URL-encoded body, and encoded params
    /// verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport handle cannot be created.
    pub fn prepare_post(
        &mut self,
        url: &str,
        params: Option<Params>,
        headers: &[(&str, &str)],
    ) -> Result<(), InitializationError> {
        self.open_handle()?;

        let body = match params {
            Some(params) if params.has_file_upload() => match params {
                Params::Form(fields) => RequestBody::Multipart(fields),
                Params::Encoded(encoded) => RequestBody::Raw(encoded),
            },
            Some(Params::Form(fields)) if !fields.is_empty() => {
                RequestBody::UrlEncoded(encode_form(&fields))
            }
            Some(Params::Encoded(encoded)) if !encoded.is_empty() => RequestBody::Raw(encoded),
            _ => RequestBody::Empty,
        };
        debug!("Prepared POST {url}");

        let mut request = self.base_request(HttpMethod::Post, url.to_string(), headers);
        request.body = body;
        request.buffer_size = self.limits.buffer_size;
        self.install(request);
        Ok(())
    }

    /// Hands over a transfer that a batch driver already performed.
    pub fn deliver(&mut self, transfer: Transfer) {
        self.completed = Some(transfer);
    }

    /// Performs the prepared request now and keeps the result for the next
    /// `execute` (which must run in multi mode to consume it).
    pub async fn perform_pending(&mut self) {
        let transfer = match &self.request {
            Some(request) => self.transport.perform(request).await,
            None => Transfer::not_performed(),
        };
        self.deliver(transfer);
    }

    /// Executes the prepared request, following redirects.
    ///
    /// `keys` selects the metadata collected for every attempt, in addition
    /// to the error pair, effective URL and status code. Transport failures
    /// are reported on the returned response, never as `Err`.
    pub async fn execute(&mut self, keys: &[MetadataKey]) -> Response {
        self.hop_metadata.clear();
        let mut hops = 0u32;
        let mut redirect_time = Duration::ZERO;

        let response = loop {
            let mut transfer = self.next_transfer().await;
            transfer.info.redirect_count = hops;
            if hops > 0 {
                transfer.info.redirect_time = Some(redirect_time);
            }

            let metadata = collect_metadata(keys, &transfer.info, &transfer.error);
            self.metadata = metadata.clone();
            self.hop_metadata.push(metadata);

            if transfer.error.has_error() || !REDIRECT_STATUS_CODES.contains(&transfer.info.http_code)
            {
                break build_response(&transfer);
            }

            if hops >= self.limits.max_redirects {
                warn!(
                    "Redirect limit of {} reached at {}, returning last response",
                    self.limits.max_redirects, transfer.info.effective_url
                );
                break build_response(&transfer).with_redirect_cap_exceeded(true);
            }

            let Some(target) = transfer.info.redirect_url.clone() else {
                warn!(
                    "Redirect status {} for {} but no Location header",
                    transfer.info.http_code, transfer.info.effective_url
                );
                break build_response(&transfer);
            };

            hops += 1;
            redirect_time += transfer.info.total_time.unwrap_or_default();
            debug!("Redirect {hops}: {} -> {target}", transfer.info.effective_url);

            if let Err(e) = self.reprepare(&target) {
                let error = TransferError::from_kind(TransferErrorKind::Other, e);
                break build_response(&Transfer::failed(target, error));
            }
        };

        self.response = Some(response.clone());
        response
    }

    /// Metadata of the most recent attempt.
    pub fn metadata(&self) -> &RequestMetadata {
        &self.metadata
    }

    /// Metadata of every attempt in the last redirect chain, first to last.
    pub fn hop_metadata(&self) -> &[RequestMetadata] {
        &self.hop_metadata
    }

    /// Response produced by the last `execute`.
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    fn open_handle(&mut self) -> Result<(), InitializationError> {
        self.completed = None;
        self.transport.open(&self.options, self.strategy)
    }

    fn base_request(
        &mut self,
        method: HttpMethod,
        url: String,
        headers: &[(&str, &str)],
    ) -> PreparedRequest {
        self.method = method;
        let mut request = PreparedRequest::new(method, url);
        request.headers = headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        request
    }

    fn install(&mut self, request: PreparedRequest) {
        self.request = Some(request);
    }

    /// Re-prepares with the original method and no params or headers.
    fn reprepare(&mut self, url: &str) -> Result<(), InitializationError> {
        match self.method {
            HttpMethod::Get => self.prepare_get(url, None, &[]),
            HttpMethod::Post => self.prepare_post(url, None, &[]),
        }
    }

    async fn next_transfer(&mut self) -> Transfer {
        if self.multi {
            if let Some(transfer) = self.completed.take() {
                return transfer;
            }
        }
        match &self.request {
            Some(request) => self.transport.perform(request).await,
            None => Transfer::not_performed(),
        }
    }
}

fn build_response(transfer: &Transfer) -> Response {
    Response::make(
        transfer.info.effective_url.clone(),
        transfer.info.http_code,
        &transfer.raw,
        transfer.header_size,
        transfer.error.clone(),
    )
}
