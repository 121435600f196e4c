//! Asynchronous job submission
//!
//! Fire-and-forget work on a rayon pool. Jobs must not touch simulation
//! state; they report back through a [`Mailbox`](crate::mailbox::Mailbox).

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobQueueError {
    #[error("failed to build job pool: {0}")]
    Build(#[from] ThreadPoolBuildError),
}

#[derive(Default)]
struct InFlight {
    count: Mutex<usize>,
    idle: Condvar,
}

impl InFlight {
    fn begin(&self) {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }

    fn finish(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }
}

// Decrements even if the job unwinds.
struct FinishGuard(Arc<InFlight>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.finish();
    }
}

pub struct JobQueue {
    pool: ThreadPool,
    in_flight: Arc<InFlight>,
}

impl JobQueue {
    /// A pool of `threads` workers; 0 lets rayon pick one per core.
    pub fn new(threads: usize) -> Result<Self, JobQueueError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("terra-job-{i}"))
            .build()?;
        tracing::debug!(threads = pool.current_num_threads(), "job pool started");
        Ok(Self {
            pool,
            in_flight: Arc::new(InFlight::default()),
        })
    }

    pub fn add_async<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.in_flight.begin();
        let guard = FinishGuard(Arc::clone(&self.in_flight));
        self.pool.spawn(move || {
            let _guard = guard;
            job();
        });
    }

    /// Jobs submitted but not yet finished.
    pub fn pending(&self) -> usize {
        *self
            .in_flight
            .count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until every submitted job has finished.
    pub fn wait_idle(&self) {
        let mut count = self
            .in_flight
            .count
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while *count > 0 {
            count = self
                .in_flight
                .idle
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like `wait_idle`, giving up after `timeout`. Returns true if idle.
    pub fn wait_idle_timeout(&self, timeout: Duration) -> bool {
        let count = self
            .in_flight
            .count
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (count, _) = self
            .in_flight
            .idle
            .wait_timeout_while(count, timeout, |count| *count > 0)
            .unwrap_or_else(PoisonError::into_inner);
        *count == 0
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}
