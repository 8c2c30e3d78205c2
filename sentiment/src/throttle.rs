//! Request pacing shared by all batch workers

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::client::{CompletionClient, CompletionError, CompletionRequest};

/// Wraps a client and spaces request starts at least `min_interval` apart.
///
/// Slots are reserved under the lock and waited for outside it, so concurrent
/// callers queue up in reservation order.
pub struct ThrottledClient<C> {
    inner: C,
    min_interval: Option<Duration>,
    next_slot: Mutex<Option<Instant>>,
}

impl<C> ThrottledClient<C> {
    pub fn new(inner: C, min_interval: Option<Duration>) -> Self {
        Self {
            inner,
            min_interval,
            next_slot: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    async fn wait_for_slot(&self) {
        let Some(interval) = self.min_interval else {
            return;
        };

        let start = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let start = match *next {
                Some(slot) if slot > now => slot,
                _ => now,
            };
            *next = Some(start + interval);
            start
        };

        if start > Instant::now() {
            tracing::debug!(wait = ?start - Instant::now(), "Throttling completion request");
            tokio::time::sleep_until(start).await;
        }
    }
}

#[async_trait]
impl<C: CompletionClient> CompletionClient for ThrottledClient<C> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.wait_for_slot().await;
        self.inner.complete(request).await
    }
}
