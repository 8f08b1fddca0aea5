//! Error categorization.
//!
//! This module maps transport library errors onto `TransferErrorKind`.

use std::error::Error as StdError;

use super::types::{TransferError, TransferErrorKind};

/// Categorizes a `reqwest::Error` into a `TransferErrorKind`.
///
/// Redirect errors cannot normally occur because clients are built with
/// redirects disabled, but are mapped for completeness.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> TransferErrorKind {
    if error.is_builder() {
        if error.url().is_some_and(|u| !matches!(u.scheme(), "http" | "https")) {
            TransferErrorKind::UnsupportedProtocol
        } else {
            TransferErrorKind::UrlMalformed
        }
    } else if error.is_redirect() {
        TransferErrorKind::TooManyRedirects
    } else if error.is_timeout() {
        TransferErrorKind::OperationTimedOut
    } else if error.is_connect() {
        categorize_connect_error(error)
    } else if error.is_body() {
        TransferErrorKind::RecvError
    } else if error.is_decode() {
        TransferErrorKind::BadContentEncoding
    } else if error.is_request() {
        TransferErrorKind::SendError
    } else {
        TransferErrorKind::Other
    }
}

/// Splits connect failures into DNS, TLS and plain connection failures by
/// inspecting the error's source chain.
fn categorize_connect_error(error: &reqwest::Error) -> TransferErrorKind {
    let chain = error_chain_text(error).to_lowercase();
    if chain.contains("dns") || chain.contains("failed to lookup") || chain.contains("resolve") {
        TransferErrorKind::CouldntResolveHost
    } else if chain.contains("tls") || chain.contains("certificate") || chain.contains("handshake")
    {
        TransferErrorKind::SslConnectError
    } else {
        TransferErrorKind::CouldntConnect
    }
}

/// Joins an error and all of its sources into one line.
pub fn error_chain_text(error: &(dyn StdError + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Converts a `reqwest::Error` into the transport error pair.
pub fn transfer_error_from_reqwest(error: &reqwest::Error) -> TransferError {
    let kind = categorize_reqwest_error(error);
    TransferError::from_kind(kind, error_chain_text(error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Leaf;

    impl std::fmt::Display for Leaf {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("connection refused")
        }
    }

    impl StdError for Leaf {}

    #[derive(Debug)]
    struct Wrapper(Leaf);

    impl std::fmt::Display for Wrapper {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("error trying to connect")
        }
    }

    impl StdError for Wrapper {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_error_chain_text_joins_sources() {
        let error = Wrapper(Leaf);
        assert_eq!(
            error_chain_text(&error),
            "error trying to connect: connection refused"
        );
    }

    #[test]
    fn test_builder_error_is_malformed_url() {
        let error = reqwest::Client::new()
            .get("http://[::1")
            .build()
            .expect_err("invalid URL should fail to build");
        assert_eq!(
            categorize_reqwest_error(&error),
            TransferErrorKind::UrlMalformed
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_connect_error() {
        // Bind then drop a listener so the port is known to be closed
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let error = reqwest::Client::new()
            .get(format!("http://{addr}/"))
            .send()
            .await
            .expect_err("closed port should refuse");
        assert_eq!(
            categorize_reqwest_error(&error),
            TransferErrorKind::CouldntConnect
        );
        let pair = transfer_error_from_reqwest(&error);
        assert_eq!(pair.code, 7);
        assert!(pair.has_error());
    }
}
