//! Response value types.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error_handling::TransferError;

use super::parse::{fold_header, parse_response};

/// Value stored for one header name.
///
/// A name seen once stores `Single`; a repeated name stores every value in
/// the order received. A one-element `Multiple` is never produced by parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// The header appeared exactly once
    Single(String),
    /// The header appeared more than once
    Multiple(Vec<String>),
}

impl FieldValue {
    /// Returns the first value received for this header.
    pub fn first(&self) -> &str {
        match self {
            FieldValue::Single(value) => value,
            FieldValue::Multiple(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// Returns all values in received order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            FieldValue::Single(value) => vec![value.as_str()],
            FieldValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Appends another occurrence, turning a single value into a sequence.
    pub(crate) fn push(&mut self, value: String) {
        match self {
            FieldValue::Single(existing) => {
                let first = std::mem::take(existing);
                *self = FieldValue::Multiple(vec![first, value]);
            }
            FieldValue::Multiple(values) => values.push(value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Single(value.to_string())
    }
}

/// Response headers keyed by lower-cased name.
pub type Headers = HashMap<String, FieldValue>;

/// The final outcome of one logical request, after redirects.
///
/// Immutable once built. A response with a transport error always has empty
/// headers and an empty body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    url: String,
    http_code: u16,
    headers: Headers,
    #[serde(skip)]
    body: Vec<u8>,
    error: TransferError,
    redirect_cap_exceeded: bool,
}

impl Response {
    /// Creates a response from already separated parts.
    ///
    /// Header names are lower-cased; names that collide after lower-casing are
    /// folded like repeated header lines. If `error` is set, headers and body
    /// are dropped.
    pub fn new(
        url: impl Into<String>,
        http_code: u16,
        body: Vec<u8>,
        headers: impl IntoIterator<Item = (String, FieldValue)>,
        error: TransferError,
    ) -> Self {
        let (headers, body) = if error.has_error() {
            (Headers::new(), Vec::new())
        } else {
            let mut folded = Headers::new();
            for (name, value) in headers {
                for single in value.values() {
                    fold_header(&mut folded, &name, single.to_string());
                }
            }
            (folded, body)
        };

        Self {
            url: url.into(),
            http_code,
            headers,
            body,
            error,
            redirect_cap_exceeded: false,
        }
    }

    /// Builds a response from the raw wire bytes of a transfer.
    ///
    /// `header_size` is the length of the status line plus header block as
    /// reported by the transport. Parsing is skipped entirely when `error`
    /// is set.
    pub fn make(
        url: impl Into<String>,
        http_code: u16,
        raw: &[u8],
        header_size: usize,
        error: TransferError,
    ) -> Self {
        if error.has_error() {
            return Self::new(url, http_code, Vec::new(), Headers::new(), error);
        }

        let (headers, body) = parse_response(raw, header_size);
        Self {
            url: url.into(),
            http_code,
            headers,
            body,
            error,
            redirect_cap_exceeded: false,
        }
    }

    /// Marks this response as the last one obtained before the redirect cap
    /// stopped the chain.
    pub(crate) fn with_redirect_cap_exceeded(mut self, exceeded: bool) -> Self {
        self.redirect_cap_exceeded = exceeded;
        self
    }

    /// Final effective URL after redirects.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// HTTP status code (0 if no response was received).
    pub fn http_code(&self) -> u16 {
        self.http_code
    }

    /// Looks up a header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&FieldValue> {
        self.headers.get(&name.to_lowercase())
    }

    /// All headers, keyed by lower-cased name.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Raw response body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Response body decoded as UTF-8, replacing invalid sequences.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Returns `true` if the transport reported an error code or message.
    pub fn has_error(&self) -> bool {
        self.error.has_error()
    }

    /// The transport's `(code, message)` pair.
    pub fn error(&self) -> &TransferError {
        &self.error
    }

    /// Returns `true` if the executor stopped following redirects because
    /// the configured maximum was reached. The response then describes the
    /// last redirect it received.
    pub fn redirect_cap_exceeded(&self) -> bool {
        self.redirect_cap_exceeded
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.body))
    }
}
