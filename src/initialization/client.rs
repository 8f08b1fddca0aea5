//! HTTP client initialization.
//!
//! This module builds the `reqwest::Client` behind a transport handle from a
//! `TransportOptions` value.

use std::sync::Arc;

use reqwest::dns::Resolve;
use reqwest::ClientBuilder;

use crate::config::TransportOptions;
use crate::error_handling::InitializationError;

/// Initializes an HTTP client for the given options.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent, total timeout and connect timeout from `options`
/// - Redirects disabled (the executor follows them itself, hop by hop)
/// - Certificate verification according to `options.verify_peer`
/// - Rustls TLS backend
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(options: &TransportOptions) -> Result<reqwest::Client, InitializationError> {
    Ok(builder_for(options).build()?)
}

/// Same as [`init_client`], resolving names through `resolver`.
pub(crate) fn init_client_with_resolver<R: Resolve + 'static>(
    options: &TransportOptions,
    resolver: Arc<R>,
) -> Result<reqwest::Client, InitializationError> {
    Ok(builder_for(options).dns_resolver(resolver).build()?)
}

fn builder_for(options: &TransportOptions) -> ClientBuilder {
    ClientBuilder::new()
        .use_rustls_tls()
        .redirect(reqwest::redirect::Policy::none())
        .danger_accept_invalid_certs(!options.verify_peer)
        .timeout(options.timeout)
        .connect_timeout(options.connect_timeout)
        .user_agent(options.user_agent.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{all_of, matchers::*, responders::*, Expectation, Server};

    #[test]
    fn test_init_client_with_defaults() {
        assert!(init_client(&TransportOptions::default()).is_ok());
    }

    #[tokio::test]
    async fn test_client_does_not_follow_redirects() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/moved")).respond_with(
                status_code(301).append_header("Location", "/elsewhere"),
            ),
        );

        let client = init_client(&TransportOptions::default()).expect("client");
        let response = client
            .get(server.url("/moved").to_string())
            .send()
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), 301);
    }

    #[tokio::test]
    async fn test_client_sends_configured_user_agent() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/ua"),
                request::headers(contains(("user-agent", "probe/2.0"))),
            ])
            .respond_with(status_code(200)),
        );

        let options = TransportOptions {
            user_agent: "probe/2.0".to_string(),
            ..Default::default()
        };
        let client = init_client(&options).expect("client");
        let response = client
            .get(server.url("/ua").to_string())
            .send()
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), 200);
    }
}
