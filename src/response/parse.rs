//! Raw HTTP response parsing.
//!
//! Splits the bytes returned by a transport into a header map and a body.
//! Parsing never fails: malformed input degrades to partial or empty results.

use log::warn;

use super::types::{FieldValue, Headers};

/// Splits `raw` into parsed headers and body.
///
/// The first `header_size` bytes are the status line and header lines, the
/// remainder is the body. A `header_size` of zero means the transport did not
/// report one; nothing is parsed and both parts come back empty.
pub fn parse_response(raw: &[u8], header_size: usize) -> (Headers, Vec<u8>) {
    if header_size == 0 {
        warn!(
            "No header block size reported for {} byte response, discarding it",
            raw.len()
        );
        return (Headers::new(), Vec::new());
    }

    let split = header_size.min(raw.len());
    let (block, body) = raw.split_at(split);
    if block.is_empty() {
        warn!("Empty header block in response, nothing to parse");
        return (Headers::new(), Vec::new());
    }

    (parse_header_block(block), body.to_vec())
}

/// Parses a header block, skipping its status line.
///
/// Lines are split on `\n` (a trailing `\r` is removed by trimming). Each
/// line is split once on the first `:`; a line without a colon yields an
/// empty value. Lines whose name is empty are ignored.
pub fn parse_header_block(block: &[u8]) -> Headers {
    let text = String::from_utf8_lossy(block);
    let mut headers = Headers::new();

    for line in text.split('\n').skip(1) {
        let (name, value) = match line.split_once(':') {
            Some((name, value)) => (name.trim(), value.trim()),
            None => (line.trim(), ""),
        };
        if name.is_empty() {
            continue;
        }
        fold_header(&mut headers, name, value.to_string());
    }

    headers
}

/// Inserts one header occurrence under its lower-cased name.
pub(crate) fn fold_header(headers: &mut Headers, name: &str, value: String) {
    let key = name.to_lowercase();
    match headers.get_mut(&key) {
        Some(existing) => existing.push(value),
        None => {
            headers.insert(key, FieldValue::Single(value));
        }
    }
}
