//! Request parameters and their encodings.

use std::path::PathBuf;

use log::warn;
use url::form_urlencoded;

/// A file to upload as part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Local file to read
    pub path: PathBuf,
    /// File name sent in the part's `Content-Disposition` (defaults to the path's file name)
    pub file_name: Option<String>,
    /// MIME type of the part (defaults to `application/octet-stream`)
    pub mime_type: Option<String>,
}

impl FileUpload {
    /// Uploads the file at `path` under its own name.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file_name: None,
            mime_type: None,
        }
    }

    /// Overrides the file name sent to the server.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Sets the part's MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// File name sent to the server.
    pub fn file_name(&self) -> String {
        self.file_name.clone().unwrap_or_else(|| {
            self.path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".to_string())
        })
    }
}

/// One form parameter value: plain text, or a file-upload marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Plain text value
    Text(String),
    /// File content to upload
    File(FileUpload),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<FileUpload> for ParamValue {
    fn from(value: FileUpload) -> Self {
        ParamValue::File(value)
    }
}

/// A named form parameter.
pub type FormField = (String, ParamValue);

/// Query or body parameters for a prepared request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Params {
    /// Key/value pairs, URL-encoded (or sent as multipart when a file is present)
    Form(Vec<FormField>),
    /// A pre-encoded string used verbatim
    Encoded(String),
}

impl Params {
    /// Builds form parameters from key/value pairs, keeping their order.
    ///
    /// # Examples
    ///
    /// ```
    /// use transfer_client::{FileUpload, Params};
    ///
    /// let params = Params::form([("name", "report")]);
    /// assert!(!params.has_file_upload());
    ///
    /// let upload = Params::form(vec![("doc", FileUpload::new("/tmp/report.pdf"))]);
    /// assert!(upload.has_file_upload());
    /// ```
    pub fn form<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        Params::Form(
            fields
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Returns `true` if any value is a file-upload marker.
    pub fn has_file_upload(&self) -> bool {
        match self {
            Params::Form(fields) => fields
                .iter()
                .any(|(_, value)| matches!(value, ParamValue::File(_))),
            Params::Encoded(_) => false,
        }
    }

    /// Renders the parameters as a query string / URL-encoded body.
    ///
    /// File-upload markers cannot be URL-encoded and are skipped.
    pub fn to_query_string(&self) -> String {
        match self {
            Params::Form(fields) => encode_form(fields),
            Params::Encoded(encoded) => encoded.clone(),
        }
    }
}

impl From<&str> for Params {
    fn from(encoded: &str) -> Self {
        Params::Encoded(encoded.to_string())
    }
}

impl From<String> for Params {
    fn from(encoded: String) -> Self {
        Params::Encoded(encoded)
    }
}

/// URL-encodes text fields as `application/x-www-form-urlencoded`.
pub(crate) fn encode_form(fields: &[FormField]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in fields {
        match value {
            ParamValue::Text(text) => {
                serializer.append_pair(key, text);
            }
            ParamValue::File(upload) => {
                warn!(
                    "Skipping file parameter '{}' ({}) in URL-encoded data",
                    key,
                    upload.path.display()
                );
            }
        }
    }
    serializer.finish()
}

/// Appends `query` to `url`: trailing `?`s are stripped first, then the
/// query is joined with `&` if the URL already has one, else with `?`.
pub(crate) fn append_query(url: &str, query: &str) -> String {
    let base = url.trim_end_matches('?');
    if query.is_empty() {
        return base.to_string();
    }
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{query}")
}
