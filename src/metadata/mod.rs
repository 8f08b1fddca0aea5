//! Per-attempt diagnostic metadata.
//!
//! A transport reports a [`TransferInfo`] for every transfer. Callers choose
//! which fields they want through [`MetadataKey`]s; the error pair, effective
//! URL and status code are always collected.

mod keys;
mod types;

pub use keys::{
    collect_metadata, MetadataKey, ERRNO_LABEL, ERROR_LABEL, HTTP_CODE_LABEL, URL_LABEL,
};
pub use types::{MetaValue, RequestMetadata, TransferInfo};
