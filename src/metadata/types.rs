//! Metadata value types.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

/// Diagnostic fields reported by a transport for one transfer.
///
/// Fields a transport cannot measure stay `None` (or zero for counters).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferInfo {
    /// URL the response was received from
    pub effective_url: String,
    /// HTTP status code (0 if no response was received)
    pub http_code: u16,
    /// Size of the status line plus header block, in bytes
    pub header_size: usize,
    /// Remote document modification time (Unix seconds)
    pub file_time: Option<i64>,
    /// Redirect hops taken before this transfer
    pub redirect_count: u32,
    /// Total transfer time
    pub total_time: Option<Duration>,
    /// Time until the name was resolved
    pub name_lookup_time: Option<Duration>,
    /// Time until the connection was established
    pub connect_time: Option<Duration>,
    /// Time until the request was about to be sent
    pub pre_transfer_time: Option<Duration>,
    /// Time until the response head arrived
    pub start_transfer_time: Option<Duration>,
    /// Time spent on the redirect hops before this transfer
    pub redirect_time: Option<Duration>,
    /// Absolute target of a redirect response
    pub redirect_url: Option<String>,
    /// Remote IP address
    pub primary_ip: Option<String>,
    /// Remote port
    pub primary_port: Option<u16>,
    /// Local IP address
    pub local_ip: Option<String>,
    /// Local port
    pub local_port: Option<u16>,
    /// Average download speed in bytes per second
    pub speed_download: f64,
    /// Average upload speed in bytes per second
    pub speed_upload: f64,
    /// Bytes uploaded
    pub size_upload: u64,
    /// Bytes downloaded (body only)
    pub size_download: u64,
    /// Result of TLS peer verification (0 = verified)
    pub ssl_verify_result: Option<i64>,
    /// TLS backends available to the transport
    pub ssl_engines: Vec<String>,
    /// Response `Content-Type`
    pub content_type: Option<String>,
}

/// One metadata value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    /// Field not available
    Null,
    /// Integer field (counts, sizes, codes, ports)
    Integer(i64),
    /// Floating point field (seconds, bytes per second)
    Float(f64),
    /// Text field (URLs, addresses, formatted times)
    Text(String),
    /// List field (TLS engines)
    List(Vec<String>),
}

impl MetaValue {
    /// Returns the integer value, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetaValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the float value, if this is a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetaValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the text value, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Returns `true` for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, MetaValue::Null)
    }
}

impl From<Option<Duration>> for MetaValue {
    fn from(value: Option<Duration>) -> Self {
        value.map_or(MetaValue::Null, |d| MetaValue::Float(d.as_secs_f64()))
    }
}

impl From<Option<String>> for MetaValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(MetaValue::Null, MetaValue::Text)
    }
}

impl From<Option<u16>> for MetaValue {
    fn from(value: Option<u16>) -> Self {
        value.map_or(MetaValue::Null, |v| MetaValue::Integer(i64::from(v)))
    }
}

/// Metadata collected for one request attempt, keyed by field label.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequestMetadata {
    fields: BTreeMap<&'static str, MetaValue>,
}

impl RequestMetadata {
    /// Creates an empty metadata map.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, label: &'static str, value: MetaValue) {
        self.fields.insert(label, value);
    }

    /// Looks up a field by label (e.g. `"total_time"`).
    pub fn get(&self, label: &str) -> Option<&MetaValue> {
        self.fields.get(label)
    }

    /// Iterates over fields in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &MetaValue)> {
        self.fields.iter().map(|(label, value)| (*label, value))
    }

    /// Number of collected fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
