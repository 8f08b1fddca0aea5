//! Transport backed by `reqwest`.
//!
//! The response head is serialised back to wire form so the header block
//! size handed to the parser is exact. The body is streamed chunk by chunk so
//! the download-size limit can abort the transfer.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::DateTime;
use log::{debug, trace};
use reqwest::header::{HeaderName, CONTENT_TYPE, LAST_MODIFIED, LOCATION};
use reqwest::multipart::{Form, Part};

use crate::config::{TransportOptions, FALLBACK_BODY_CAPACITY, FORM_URLENCODED, TLS_BACKEND};
use crate::error_handling::{
    transfer_error_from_reqwest, InitializationError, TransferError, TransferErrorKind,
};
use crate::executor::{FormField, ParamValue};
use crate::initialization::init_client_with_resolver;
use crate::metadata::TransferInfo;

use super::resolver::TimingResolver;
use super::{HandleStrategy, HttpMethod, PreparedRequest, RequestBody, Transfer, Transport};

/// A [`Transport`] that performs requests with a `reqwest::Client`.
///
/// The client never follows redirects. Under [`HandleStrategy::ResetInPlace`]
/// the client (and its connection pool) is kept across prepare steps as long
/// as the options do not change.
#[derive(Debug, Default)]
pub struct ReqwestTransport {
    client: Option<reqwest::Client>,
    options: Option<TransportOptions>,
    resolver: Arc<TimingResolver>,
}

impl ReqwestTransport {
    /// Creates a transport without a handle; `open` creates it.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for ReqwestTransport {
    fn open(
        &mut self,
        options: &TransportOptions,
        strategy: HandleStrategy,
    ) -> Result<(), InitializationError> {
        let reusable = strategy == HandleStrategy::ResetInPlace
            && self.client.is_some()
            && self.options.as_ref() == Some(options);
        if reusable {
            trace!("Reusing transport handle");
            return Ok(());
        }

        // Release the old handle before building its replacement
        self.client = None;
        self.options = None;
        let client = init_client_with_resolver(options, Arc::clone(&self.resolver))?;
        debug!("Created transport handle ({strategy:?})");
        self.client = Some(client);
        self.options = Some(options.clone());
        Ok(())
    }

    fn perform(&mut self, request: &PreparedRequest) -> impl Future<Output = Transfer> + Send {
        let client = self.client.clone();
        let verify_peer = self.options.as_ref().is_some_and(|o| o.verify_peer);
        let resolver = Arc::clone(&self.resolver);
        let request = request.clone();

        async move {
            match client {
                Some(client) => perform_request(client, request, resolver, verify_peer).await,
                None => Transfer::failed(
                    request.url,
                    TransferError::from_kind(
                        TransferErrorKind::NotPerformed,
                        "transport handle not opened",
                    ),
                ),
            }
        }
    }
}

async fn perform_request(
    client: reqwest::Client,
    request: PreparedRequest,
    resolver: Arc<TimingResolver>,
    verify_peer: bool,
) -> Transfer {
    resolver.reset();
    let started = Instant::now();

    let (builder, size_upload) = match build_request(&client, &request).await {
        Ok(built) => built,
        Err(error) => return Transfer::failed(request.url, error),
    };

    let mut response = match builder.send().await {
        Ok(response) => response,
        Err(e) => {
            debug!("{} {} failed: {e}", request.method, request.url);
            let mut transfer = Transfer::failed(request.url, transfer_error_from_reqwest(&e));
            transfer.info.total_time = Some(started.elapsed());
            transfer.info.name_lookup_time = resolver.last_lookup();
            return transfer;
        }
    };
    let start_transfer_time = started.elapsed();

    let mut raw = serialize_head(&response);
    let header_size = raw.len();
    let capacity = match request.buffer_size {
        0 => FALLBACK_BODY_CAPACITY,
        size => size,
    };
    raw.reserve(capacity);

    let mut info = head_info(&response, header_size, verify_peer);
    info.start_transfer_time = Some(start_transfer_time);
    info.name_lookup_time = resolver.last_lookup();
    info.size_upload = size_upload;

    let error = read_body(&mut response, &mut raw, request.max_download_size).await;
    let total_time = started.elapsed();

    info.size_download = (raw.len() - header_size) as u64;
    info.total_time = Some(total_time);
    info.speed_download = bytes_per_second(info.size_download, total_time);
    info.speed_upload = bytes_per_second(info.size_upload, total_time);

    debug!(
        "{} {} -> {} ({} body bytes in {:.3}s)",
        request.method,
        request.url,
        info.http_code,
        info.size_download,
        total_time.as_secs_f64()
    );

    Transfer {
        raw,
        header_size,
        info,
        error,
    }
}

/// Builds the reqwest request; returns it with the number of body bytes to upload.
async fn build_request(
    client: &reqwest::Client,
    request: &PreparedRequest,
) -> Result<(reqwest::RequestBuilder, u64), TransferError> {
    let method = match request.method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
    };
    let mut builder = client.request(method, request.url.as_str());
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let has_content_type = request
        .headers
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));

    let size_upload = match &request.body {
        RequestBody::Empty => 0,
        RequestBody::UrlEncoded(body) | RequestBody::Raw(body) => {
            if !has_content_type {
                builder = builder.header(CONTENT_TYPE, FORM_URLENCODED);
            }
            builder = builder.body(body.clone());
            body.len() as u64
        }
        RequestBody::Multipart(fields) => {
            let (form, size) = multipart_form(fields).await?;
            builder = builder.multipart(form);
            size
        }
    };

    Ok((builder, size_upload))
}

async fn multipart_form(fields: &[FormField]) -> Result<(Form, u64), TransferError> {
    let mut form = Form::new();
    let mut size = 0u64;

    for (name, value) in fields {
        match value {
            ParamValue::Text(text) => {
                size += text.len() as u64;
                form = form.text(name.clone(), text.clone());
            }
            ParamValue::File(upload) => {
                let bytes = tokio::fs::read(&upload.path).await.map_err(|e| {
                    TransferError::from_kind(
                        TransferErrorKind::ReadError,
                        format!("{}: {e}", upload.path.display()),
                    )
                })?;
                size += bytes.len() as u64;
                let mut part = Part::bytes(bytes).file_name(upload.file_name());
                if let Some(mime) = &upload.mime_type {
                    part = part.mime_str(mime).map_err(|e| {
                        TransferError::from_kind(
                            TransferErrorKind::Other,
                            format!("invalid MIME type '{mime}': {e}"),
                        )
                    })?;
                }
                form = form.part(name.clone(), part);
            }
        }
    }

    Ok((form, size))
}

/// Renders the status line and headers as they appeared on the wire.
fn serialize_head(response: &reqwest::Response) -> Vec<u8> {
    let status = response.status();
    let mut head = format!(
        "{:?} {} {}\r\n",
        response.version(),
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )
    .into_bytes();

    for (name, value) in response.headers() {
        head.extend_from_slice(name.as_str().as_bytes());
        head.extend_from_slice(b": ");
        head.extend_from_slice(value.as_bytes());
        head.extend_from_slice(b"\r\n");
    }
    head.extend_from_slice(b"\r\n");
    head
}

/// Diagnostic fields available once the response head arrived.
fn head_info(response: &reqwest::Response, header_size: usize, verify_peer: bool) -> TransferInfo {
    let headers = response.headers();
    let header_text = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let redirect_url = if response.status().is_redirection() {
        header_text(LOCATION).and_then(|location| {
            response
                .url()
                .join(&location)
                .map(|url| url.to_string())
                .ok()
        })
    } else {
        None
    };

    let file_time = header_text(LAST_MODIFIED)
        .and_then(|modified| DateTime::parse_from_rfc2822(&modified).ok())
        .map(|dt| dt.timestamp());

    let https = response.url().scheme() == "https";

    TransferInfo {
        effective_url: response.url().to_string(),
        http_code: response.status().as_u16(),
        header_size,
        file_time,
        redirect_url,
        primary_ip: response.remote_addr().map(|addr| addr.ip().to_string()),
        primary_port: response.remote_addr().map(|addr| addr.port()),
        ssl_verify_result: (https && verify_peer).then_some(0),
        ssl_engines: vec![TLS_BACKEND.to_string()],
        content_type: header_text(CONTENT_TYPE),
        ..Default::default()
    }
}

/// Streams the body into `raw`, stopping once `max_download_size` bytes
/// were received (0 = no limit).
async fn read_body(
    response: &mut reqwest::Response,
    raw: &mut Vec<u8>,
    max_download_size: u64,
) -> TransferError {
    let mut downloaded = 0u64;
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                downloaded += chunk.len() as u64;
                raw.extend_from_slice(&chunk);
                if max_download_size > 0 && downloaded >= max_download_size {
                    return TransferError::from_kind(
                        TransferErrorKind::AbortedByCallback,
                        format!("download reached the {max_download_size} byte limit"),
                    );
                }
            }
            Ok(None) => return TransferError::default(),
            Err(e) => return transfer_error_from_reqwest(&e),
        }
    }
}

fn bytes_per_second(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        bytes as f64 / secs
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_second() {
        assert_eq!(bytes_per_second(1000, Duration::from_secs(2)), 500.0);
        assert_eq!(bytes_per_second(1000, Duration::ZERO), 0.0);
    }

    #[tokio::test]
    async fn test_perform_without_open_reports_not_performed() {
        let mut transport = ReqwestTransport::new();
        let transfer = transport
            .perform(&PreparedRequest::new(HttpMethod::Get, "http://127.0.0.1:1/"))
            .await;
        assert_eq!(transfer.error.code, TransferErrorKind::NotPerformed.code());
        assert_eq!(transfer.info.effective_url, "http://127.0.0.1:1/");
        assert!(transfer.raw.is_empty());
    }

    #[test]
    fn test_open_reuses_handle_for_same_options() {
        let mut transport = ReqwestTransport::new();
        let options = TransportOptions::default();
        transport
            .open(&options, HandleStrategy::ResetInPlace)
            .expect("open");
        assert!(transport.client.is_some());
        transport
            .open(&options, HandleStrategy::ResetInPlace)
            .expect("reopen");
        assert_eq!(transport.options.as_ref(), Some(&options));

        let changed = TransportOptions {
            verify_peer: true,
            ..Default::default()
        };
        transport
            .open(&changed, HandleStrategy::Recreate)
            .expect("recreate");
        assert_eq!(transport.options.as_ref(), Some(&changed));
    }

    #[tokio::test]
    async fn test_missing_upload_file_is_read_error() {
        let fields = vec![(
            "doc".to_string(),
            ParamValue::File(crate::executor::FileUpload::new(
                "/nonexistent/transfer_client/upload.bin",
            )),
        )];
        let error = multipart_form(&fields).await.expect_err("missing file");
        assert_eq!(error.code, TransferErrorKind::ReadError.code());
    }
}
