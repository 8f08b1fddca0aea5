//! Metadata keys and the key -> (label, accessor) table.
//!
//! Adding a diagnostic field means adding a `MetadataKey` variant and one
//! row to `FIELDS`; collection itself never branches on the key.

use chrono::DateTime;
use clap::ValueEnum;
use strum_macros::EnumIter as EnumIterMacro;

use crate::config::FILE_TIME_FORMAT;
use crate::error_handling::TransferError;

use super::types::{MetaValue, RequestMetadata, TransferInfo};

/// Selects a diagnostic field to collect from a completed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro, ValueEnum)]
pub enum MetadataKey {
    /// Remote modification time, `YYYY-MM-DD HH:MM:SS` (UTC) or null
    FileTime,
    /// Redirect hops taken before the transfer
    RedirectCount,
    /// Total transfer time in seconds
    TotalTime,
    /// Name lookup time in seconds
    NameLookupTime,
    /// Connect time in seconds
    ConnectTime,
    /// Pre-transfer time in seconds
    PreTransferTime,
    /// Time spent on preceding redirect hops in seconds
    RedirectTime,
    /// Time until the first response byte in seconds
    StartTransferTime,
    /// Target of a redirect response
    RedirectUrl,
    /// URL the response came from
    EffectiveUrl,
    /// Remote IP address
    PrimaryIp,
    /// Average download speed in bytes per second
    SpeedDownload,
    /// Average upload speed in bytes per second
    SpeedUpload,
    /// TLS verification result
    SslVerifyResult,
    /// Available TLS engines
    SslEngines,
    /// Response content type
    ContentType,
    /// Local IP address
    LocalIp,
    /// Local port
    LocalPort,
    /// Bytes uploaded
    SizeUpload,
    /// Bytes downloaded
    SizeDownload,
}

struct MetadataField {
    key: MetadataKey,
    label: &'static str,
    read: fn(&TransferInfo) -> MetaValue,
}

const FIELDS: &[MetadataField] = &[
    MetadataField {
        key: MetadataKey::FileTime,
        label: "file_time",
        read: |info| format_file_time(info.file_time),
    },
    MetadataField {
        key: MetadataKey::RedirectCount,
        label: "redirect_count",
        read: |info| MetaValue::Integer(i64::from(info.redirect_count)),
    },
    MetadataField {
        key: MetadataKey::TotalTime,
        label: "total_time",
        read: |info| info.total_time.into(),
    },
    MetadataField {
        key: MetadataKey::NameLookupTime,
        label: "name_lookup_time",
        read: |info| info.name_lookup_time.into(),
    },
    MetadataField {
        key: MetadataKey::ConnectTime,
        label: "connect_time",
        read: |info| info.connect_time.into(),
    },
    MetadataField {
        key: MetadataKey::PreTransferTime,
        label: "pre_transfer_time",
        read: |info| info.pre_transfer_time.into(),
    },
    MetadataField {
        key: MetadataKey::RedirectTime,
        label: "redirect_time",
        read: |info| info.redirect_time.into(),
    },
    MetadataField {
        key: MetadataKey::StartTransferTime,
        label: "start_transfer_time",
        read: |info| info.start_transfer_time.into(),
    },
    MetadataField {
        key: MetadataKey::RedirectUrl,
        label: "redirect_url",
        read: |info| info.redirect_url.clone().into(),
    },
    MetadataField {
        key: MetadataKey::EffectiveUrl,
        label: "effective_url",
        read: |info| MetaValue::Text(info.effective_url.clone()),
    },
    MetadataField {
        key: MetadataKey::PrimaryIp,
        label: "primary_ip",
        read: |info| info.primary_ip.clone().into(),
    },
    MetadataField {
        key: MetadataKey::SpeedDownload,
        label: "speed_download",
        read: |info| MetaValue::Float(info.speed_download),
    },
    MetadataField {
        key: MetadataKey::SpeedUpload,
        label: "speed_upload",
        read: |info| MetaValue::Float(info.speed_upload),
    },
    MetadataField {
        key: MetadataKey::SslVerifyResult,
        label: "ssl_verify_result",
        read: |info| info.ssl_verify_result.map_or(MetaValue::Null, MetaValue::Integer),
    },
    MetadataField {
        key: MetadataKey::SslEngines,
        label: "ssl_engines",
        read: |info| MetaValue::List(info.ssl_engines.clone()),
    },
    MetadataField {
        key: MetadataKey::ContentType,
        label: "content_type",
        read: |info| info.content_type.clone().into(),
    },
    MetadataField {
        key: MetadataKey::LocalIp,
        label: "local_ip",
        read: |info| info.local_ip.clone().into(),
    },
    MetadataField {
        key: MetadataKey::LocalPort,
        label: "local_port",
        read: |info| info.local_port.into(),
    },
    MetadataField {
        key: MetadataKey::SizeUpload,
        label: "size_upload",
        read: |info| MetaValue::Integer(saturating_i64(info.size_upload)),
    },
    MetadataField {
        key: MetadataKey::SizeDownload,
        label: "size_download",
        read: |info| MetaValue::Integer(saturating_i64(info.size_download)),
    },
];

/// Label of the always-collected transport error code.
pub const ERRNO_LABEL: &str = "errno";
/// Label of the always-collected transport error message.
pub const ERROR_LABEL: &str = "error";
/// Label of the always-collected effective URL.
pub const URL_LABEL: &str = "url";
/// Label of the always-collected HTTP status code.
pub const HTTP_CODE_LABEL: &str = "http_code";

impl MetadataKey {
    fn field(&self) -> &'static MetadataField {
        FIELDS
            .iter()
            .find(|field| field.key == *self)
            .unwrap_or_else(|| unreachable!("every MetadataKey has a FIELDS row"))
    }

    /// Label under which this key's value is stored in `RequestMetadata`.
    pub fn label(&self) -> &'static str {
        self.field().label
    }

    /// Reads this key's value from a transfer.
    pub fn read(&self, info: &TransferInfo) -> MetaValue {
        (self.field().read)(info)
    }
}

/// Collects the requested keys plus the four always-collected fields.
pub fn collect_metadata(
    keys: &[MetadataKey],
    info: &TransferInfo,
    error: &TransferError,
) -> RequestMetadata {
    let mut metadata = RequestMetadata::new();
    for key in keys {
        metadata.insert(key.label(), key.read(info));
    }

    metadata.insert(ERRNO_LABEL, MetaValue::Integer(i64::from(error.code)));
    metadata.insert(ERROR_LABEL, MetaValue::Text(error.message.clone()));
    metadata.insert(URL_LABEL, MetaValue::Text(info.effective_url.clone()));
    metadata.insert(HTTP_CODE_LABEL, MetaValue::Integer(i64::from(info.http_code)));
    metadata
}

fn format_file_time(file_time: Option<i64>) -> MetaValue {
    file_time
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map_or(MetaValue::Null, |dt| {
            MetaValue::Text(dt.format(FILE_TIME_FORMAT).to_string())
        })
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;
    use strum::IntoEnumIterator;

    fn sample_info() -> TransferInfo {
        TransferInfo {
            effective_url: "http://example.com/final".to_string(),
            http_code: 200,
            file_time: Some(784_111_777),
            redirect_count: 2,
            total_time: Some(Duration::from_millis(1500)),
            redirect_url: None,
            primary_ip: Some("93.184.216.34".to_string()),
            local_port: Some(51_000),
            size_download: 1024,
            ssl_engines: vec!["rustls".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_every_key_has_exactly_one_row() {
        for key in MetadataKey::iter() {
            let rows = FIELDS.iter().filter(|field| field.key == key).count();
            assert_eq!(rows, 1, "{key:?} should have one FIELDS row");
        }
        assert_eq!(FIELDS.len(), MetadataKey::iter().count());
    }

    #[test]
    fn test_labels_are_unique_and_do_not_clash_with_fixed_fields() {
        let labels: HashSet<&str> = MetadataKey::iter().map(|k| k.label()).collect();
        assert_eq!(labels.len(), FIELDS.len());
        for fixed in [ERRNO_LABEL, ERROR_LABEL, URL_LABEL, HTTP_CODE_LABEL] {
            assert!(!labels.contains(fixed), "{fixed} clashes with a key label");
        }
    }

    #[test]
    fn test_always_collected_fields_without_keys() {
        let metadata = collect_metadata(&[], &sample_info(), &TransferError::default());
        assert_eq!(metadata.len(), 4);
        assert_eq!(metadata.get("errno"), Some(&MetaValue::Integer(0)));
        assert_eq!(metadata.get("error"), Some(&MetaValue::Text(String::new())));
        assert_eq!(
            metadata.get("url").and_then(MetaValue::as_str),
            Some("http://example.com/final")
        );
        assert_eq!(metadata.get("http_code").and_then(MetaValue::as_i64), Some(200));
    }

    #[test]
    fn test_requested_keys_are_collected() {
        let metadata = collect_metadata(
            &[
                MetadataKey::TotalTime,
                MetadataKey::RedirectCount,
                MetadataKey::PrimaryIp,
                MetadataKey::RedirectUrl,
                MetadataKey::LocalPort,
                MetadataKey::SizeDownload,
                MetadataKey::SslEngines,
            ],
            &sample_info(),
            &TransferError::default(),
        );
        assert_eq!(metadata.len(), 11);
        assert_eq!(metadata.get("total_time").and_then(MetaValue::as_f64), Some(1.5));
        assert_eq!(metadata.get("redirect_count").and_then(MetaValue::as_i64), Some(2));
        assert_eq!(
            metadata.get("primary_ip").and_then(MetaValue::as_str),
            Some("93.184.216.34")
        );
        assert!(metadata.get("redirect_url").is_some_and(MetaValue::is_null));
        assert_eq!(metadata.get("local_port").and_then(MetaValue::as_i64), Some(51_000));
        assert_eq!(metadata.get("size_download").and_then(MetaValue::as_i64), Some(1024));
        assert_eq!(
            metadata.get("ssl_engines"),
            Some(&MetaValue::List(vec!["rustls".to_string()]))
        );
        // Keys that were not requested are absent
        assert!(metadata.get("connect_time").is_none());
    }

    #[test]
    fn test_file_time_formatting() {
        let info = sample_info();
        assert_eq!(
            MetadataKey::FileTime.read(&info),
            MetaValue::Text("1994-11-06 08:49:37".to_string())
        );

        let unknown = TransferInfo::default();
        assert!(MetadataKey::FileTime.read(&unknown).is_null());
    }

    #[test]
    fn test_error_pair_is_reported() {
        let error = TransferError::new(28, "Operation timed out");
        let metadata = collect_metadata(&[], &TransferInfo::default(), &error);
        assert_eq!(metadata.get("errno").and_then(MetaValue::as_i64), Some(28));
        assert_eq!(
            metadata.get("error").and_then(MetaValue::as_str),
            Some("Operation timed out")
        );
        assert_eq!(metadata.get("http_code").and_then(MetaValue::as_i64), Some(0));
    }

    #[test]
    fn test_metadata_serializes_as_flat_object() {
        let metadata = collect_metadata(
            &[MetadataKey::TotalTime, MetadataKey::ContentType],
            &sample_info(),
            &TransferError::default(),
        );
        let json = serde_json::to_value(&metadata).expect("serialize");
        assert_eq!(json["total_time"], serde_json::json!(1.5));
        assert_eq!(json["content_type"], serde_json::Value::Null);
        assert_eq!(json["http_code"], serde_json::json!(200));
    }
}
