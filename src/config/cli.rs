//! Command-line options.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::constants::{DEFAULT_BUFFER_SIZE, DEFAULT_MAX_DOWNLOAD_SIZE, DEFAULT_MAX_REDIRECTS};
use crate::config::types::{LogFormat, LogLevel, OptionOverrides, RequestLimits};
use crate::error_handling::ParamError;
use crate::executor::{FileUpload, ParamValue, Params};
use crate::metadata::MetadataKey;
use crate::transport::HttpMethod;

/// Command-line options for a single transfer.
///
/// # Examples
///
/// ```bash
/// # Fetch a page and print timing metadata
/// transfer_client https://example.com --info total-time --info primary-ip
///
/// # Upload a file as multipart form data
/// transfer_client https://example.com/upload --method post \
///     --param title=report --file-param doc=./report.pdf
///
/// # Save the body instead of printing it
/// transfer_client https://example.com/archive.tar.gz --output ./archive.tar.gz
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "transfer_client",
    about = "Performs an HTTP GET or POST, following redirects, and reports transfer metadata.",
    version
)]
pub struct Opt {
    /// URL to request
    #[arg(value_parser)]
    pub url: String,

    /// Request method: get|post
    #[arg(long, value_enum, default_value_t = HttpMethod::Get)]
    pub method: HttpMethod,

    /// Form parameter `name=value` (query string for GET, body for POST)
    #[arg(long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// File to upload as `name=path` (POST only, sent as multipart form data)
    #[arg(long = "file-param", value_name = "NAME=PATH")]
    pub file_params: Vec<String>,

    /// Pre-encoded query string or request body, used verbatim
    #[arg(long, conflicts_with_all = ["params", "file_params"])]
    pub data: Option<String>,

    /// Extra request header `Name: value`
    #[arg(long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// Metadata field to report (repeatable)
    #[arg(long = "info", value_enum, value_name = "KEY")]
    pub info: Vec<MetadataKey>,

    /// Maximum redirect hops to follow
    #[arg(long, default_value_t = DEFAULT_MAX_REDIRECTS)]
    pub max_redirects: u32,

    /// Abort the download after this many body bytes (0 = unlimited)
    #[arg(long, default_value_t = DEFAULT_MAX_DOWNLOAD_SIZE)]
    pub max_download_size: u64,

    /// Receive buffer size hint in bytes (0 = transport default)
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    pub buffer_size: usize,

    /// Total transfer timeout in seconds (default: 6)
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Connection timeout in seconds (default: 3)
    #[arg(long)]
    pub connect_timeout_seconds: Option<u64>,

    /// Verify the server's TLS certificate
    #[arg(long)]
    pub verify_peer: bool,

    /// HTTP User-Agent header value
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Write the response body to this file instead of stdout
    #[arg(long, value_parser)]
    pub output: Option<PathBuf>,

    /// Print the response headers before the body
    #[arg(long, short = 'i')]
    pub include: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Opt {
    /// Transport option overrides given on the command line.
    pub fn overrides(&self) -> OptionOverrides {
        OptionOverrides {
            verify_peer: self.verify_peer.then_some(true),
            timeout: self.timeout_seconds.map(Duration::from_secs),
            connect_timeout: self.connect_timeout_seconds.map(Duration::from_secs),
            user_agent: self.user_agent.clone(),
        }
    }

    /// Request limits given on the command line.
    pub fn limits(&self) -> RequestLimits {
        RequestLimits {
            max_download_size: self.max_download_size,
            buffer_size: self.buffer_size,
            max_redirects: self.max_redirects,
        }
    }

    /// Request parameters, or `None` if none were given.
    ///
    /// # Errors
    ///
    /// Returns `ParamError::MissingEquals` for a parameter without `=`.
    pub fn request_params(&self) -> Result<Option<Params>, ParamError> {
        if let Some(data) = &self.data {
            return Ok(Some(Params::Encoded(data.clone())));
        }

        let mut fields = Vec::with_capacity(self.params.len() + self.file_params.len());
        for param in &self.params {
            let (name, value) = split_param(param)?;
            fields.push((name, ParamValue::Text(value)));
        }
        for param in &self.file_params {
            let (name, path) = split_param(param)?;
            fields.push((name, ParamValue::File(FileUpload::new(path))));
        }

        Ok((!fields.is_empty()).then_some(Params::Form(fields)))
    }

    /// Extra request headers as `(name, value)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `ParamError::MissingColon` for a header without `:`.
    pub fn request_headers(&self) -> Result<Vec<(String, String)>, ParamError> {
        self.headers
            .iter()
            .map(|header| {
                header
                    .split_once(':')
                    .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
                    .filter(|(name, _)| !name.is_empty())
                    .ok_or_else(|| ParamError::MissingColon(header.clone()))
            })
            .collect()
    }
}

fn split_param(param: &str) -> Result<(String, String), ParamError> {
    param
        .split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| ParamError::MissingEquals(param.to_string()))
}
