//! Request slots for concurrent crawling
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore
//! - The pacing delay a slot observes before it can be reused
//!
//! Every identifier gets its own task; the semaphore is the only thing bounding how
//! many of them are fetching at once.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// An identifier holding one request slot
///
/// The slot is released by `finish`, after the pacing delay, or immediately if the
/// value is dropped (a task that panics never holds a slot forever).
pub struct ScheduledFetch {
    pub rsid: String,
    delay: Duration,
    _permit: OwnedSemaphorePermit,
}

impl ScheduledFetch {
    /// Waits out the inter-request delay, then frees the slot
    pub async fn finish(self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        tracing::trace!("Released slot held by {}", self.rsid);
    }
}

/// Hands out request slots to crawl tasks
pub struct Scheduler {
    semaphore: Arc<Semaphore>,
    concurrency: usize,
    delay: Duration,
}

impl Scheduler {
    pub fn new(concurrency: usize, delay: Duration) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            delay,
        }
    }

    /// Waits for a free request slot for `rsid`
    ///
    /// Slots are granted in the order they were asked for. Returns `None` only if the
    /// semaphore has been closed, which this scheduler never does.
    pub async fn acquire(&self, rsid: String) -> Option<ScheduledFetch> {
        let permit = self.semaphore.clone().acquire_owned().await.ok()?;
        tracing::trace!("Scheduled {}", rsid);

        Some(ScheduledFetch {
            rsid,
            delay: self.delay,
            _permit: permit,
        })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Request slots currently free
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }
}
