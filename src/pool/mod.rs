//! Batch execution of several requests.
//!
//! A [`TransferPool`] owns executors in multi mode. Running the pool first
//! performs every prepared request concurrently, then lets each executor's
//! `execute` consume its delivered transfer (following redirects on its own).

use futures::stream::{self, StreamExt};
use log::{debug, info};

use crate::executor::RequestExecutor;
use crate::metadata::MetadataKey;
use crate::response::Response;
use crate::transport::Transport;

/// Runs a batch of prepared executors with bounded concurrency.
#[derive(Debug)]
pub struct TransferPool<T: Transport> {
    executors: Vec<RequestExecutor<T>>,
    max_in_flight: usize,
}

impl<T: Transport> TransferPool<T> {
    /// Creates an empty pool that keeps at most `max_in_flight` transfers
    /// running at once (values below 1 are treated as 1).
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            executors: Vec::new(),
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Adds a prepared executor and switches it to multi mode.
    pub fn add(&mut self, mut executor: RequestExecutor<T>) {
        executor.set_multi(true);
        self.executors.push(executor);
    }

    /// Number of executors in the pool.
    pub fn len(&self) -> usize {
        self.executors.len()
    }

    /// Returns `true` if the pool has no executors.
    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }

    /// The pooled executors, in insertion order.
    pub fn executors(&self) -> &[RequestExecutor<T>] {
        &self.executors
    }

    /// Takes the executors back out of the pool.
    pub fn into_executors(self) -> Vec<RequestExecutor<T>> {
        self.executors
    }

    /// Performs all prepared requests and returns `(id, response)` pairs in
    /// insertion order.
    pub async fn run(&mut self, keys: &[MetadataKey]) -> Vec<(Option<String>, Response)> {
        let limit = self.max_in_flight;
        info!(
            "Running {} transfers (max {limit} in flight)",
            self.executors.len()
        );

        stream::iter(self.executors.iter_mut())
            .for_each_concurrent(limit, |executor| executor.perform_pending())
            .await;
        debug!("All initial transfers completed");

        let mut results: Vec<(usize, Option<String>, Response)> =
            stream::iter(self.executors.iter_mut().enumerate())
                .map(|(index, executor)| async move {
                    let response = executor.execute(keys).await;
                    (index, executor.id().map(str::to_string), response)
                })
                .buffer_unordered(limit)
                .collect()
                .await;
        results.sort_by_key(|(index, _, _)| *index);

        let failed = results.iter().filter(|(_, _, r)| r.has_error()).count();
        info!(
            "Batch finished: {} succeeded, {failed} failed",
            results.len() - failed
        );

        results
            .into_iter()
            .map(|(_, id, response)| (id, response))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransportOptions;
    use crate::transport::ReqwestTransport;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    fn executor(id: &str, url: &str) -> RequestExecutor<ReqwestTransport> {
        let mut executor = RequestExecutor::new(
            Some(id.to_string()),
            ReqwestTransport::new(),
            TransportOptions::default(),
        );
        executor.prepare_get(url, None, &[]).expect("prepare");
        executor
    }

    #[tokio::test]
    async fn test_run_returns_results_in_insertion_order() {
        let server = Server::run();
        for (path, body) in [("/a", "alpha"), ("/b", "beta"), ("/c", "gamma")] {
            server.expect(
                Expectation::matching(request::method_path("GET", path))
                    .respond_with(status_code(200).body(body)),
            );
        }

        let mut pool = TransferPool::new(2);
        for (id, path) in [("a", "/a"), ("b", "/b"), ("c", "/c")] {
            pool.add(executor(id, &server.url(path).to_string()));
        }
        assert_eq!(pool.len(), 3);
        assert!(pool.executors().iter().all(RequestExecutor::is_multi));

        let results = pool.run(&[MetadataKey::TotalTime]).await;
        let summary: Vec<(Option<String>, String)> = results
            .into_iter()
            .map(|(id, response)| (id, response.body_text()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Some("a".to_string()), "alpha".to_string()),
                (Some("b".to_string()), "beta".to_string()),
                (Some("c".to_string()), "gamma".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_follows_redirects_per_executor() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/start")).respond_with(
                status_code(302).append_header("Location", "/done"),
            ),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/done"))
                .respond_with(status_code(200).body("done")),
        );

        let mut pool = TransferPool::new(4);
        pool.add(executor("r", &server.url("/start").to_string()));
        let results = pool.run(&[MetadataKey::RedirectCount]).await;

        let (_, response) = &results[0];
        assert_eq!(response.http_code(), 200);
        assert_eq!(response.body_text(), "done");
        let executors = pool.into_executors();
        assert_eq!(executors[0].hop_metadata().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_transfer_does_not_affect_others() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/ok"))
                .respond_with(status_code(200).body("fine")),
        );

        let mut pool = TransferPool::new(0);
        pool.add(executor("bad", "http://127.0.0.1:1/unreachable"));
        pool.add(executor("good", &server.url("/ok").to_string()));
        let results = pool.run(&[]).await;

        assert!(results[0].1.has_error());
        assert!(!results[1].1.has_error());
        assert_eq!(results[1].1.body_text(), "fine");
    }

    #[tokio::test]
    async fn test_empty_pool_runs() {
        let mut pool: TransferPool<ReqwestTransport> = TransferPool::new(1);
        assert!(pool.is_empty());
        assert!(pool.run(&[]).await.is_empty());
    }
}
