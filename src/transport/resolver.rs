//! DNS resolver that records how long the last lookup took.

use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use reqwest::dns::{Addrs, Name, Resolve, Resolving};

/// Resolves names with the system resolver and stores the duration of the
/// most recent lookup so the transport can report `name_lookup_time`.
///
/// No lookup happens when a pooled connection is reused; the slot then
/// stays empty for that transfer.
#[derive(Debug, Clone, Default)]
pub(crate) struct TimingResolver {
    last_lookup: Arc<Mutex<Option<Duration>>>,
}

impl TimingResolver {
    /// Clears the recorded lookup time before a new transfer.
    pub(crate) fn reset(&self) {
        if let Ok(mut slot) = self.last_lookup.lock() {
            *slot = None;
        }
    }

    /// Lookup time recorded since the last `reset`.
    pub(crate) fn last_lookup(&self) -> Option<Duration> {
        self.last_lookup.lock().ok().and_then(|slot| *slot)
    }
}

impl Resolve for TimingResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let slot = Arc::clone(&self.last_lookup);
        Box::pin(async move {
            let started = Instant::now();
            // Port is replaced by the connector
            let addrs: Vec<SocketAddr> = tokio::net::lookup_host((name.as_str(), 0))
                .await?
                .collect();
            if let Ok(mut last) = slot.lock() {
                *last = Some(started.elapsed());
            }
            log::trace!("Resolved {} to {} address(es)", name.as_str(), addrs.len());
            let addrs: Addrs = Box::new(addrs.into_iter());
            Ok::<Addrs, Box<dyn StdError + Send + Sync>>(addrs)
        })
    }
}
