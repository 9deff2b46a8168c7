//! Poll loop for remote long-running operations.
//!
//! State machine: SUBMITTED -> (POLLING)* -> COMPLETED | FAILED. The loop
//! sleeps a fixed interval between status refreshes, replaces the handle
//! wholesale each iteration, and terminates on completion, deadline expiry,
//! or cancellation. Progress stays inside the [20, 70] band until the loop
//! exits; the final verify/write stages advance it past that.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{AppError, AppResult};
use crate::progress::ProgressSink;
use crate::veo::client::VideoService;
use crate::veo::types::Operation;

pub const POLL_PROGRESS_FLOOR: u8 = 20;
pub const POLL_PROGRESS_CEILING: u8 = 70;

#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Sleep between status refreshes.
    pub interval: Duration,
    /// Overall deadline; the loop fails with a timeout once it elapses.
    pub deadline: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        PollOptions { interval: Duration::from_secs(20), deadline: Duration::from_secs(600) }
    }
}

/// Cooperative cancellation flag, checked before every sleep.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Wait for `operation` to report done, refreshing it every
/// `options.interval`.
///
/// Returns the completed operation, or `RemoteJob` if the service reported a
/// terminal error, `Timeout` once the deadline passes, `Cancelled` if the
/// token fired.
pub async fn poll_until_done<S: VideoService + ?Sized>(
    service: &S,
    mut operation: Operation,
    options: &PollOptions,
    progress: &mut dyn ProgressSink,
    cancel: &CancelToken,
) -> AppResult<Operation> {
    let started = Instant::now();

    while !operation.done {
        progress.update(poll_progress(started.elapsed(), options.deadline));
        if cancel.is_cancelled() {
            tracing::info!("Polling cancelled for operation {}", operation.name);
            return Err(AppError::Cancelled);
        }
        if started.elapsed() >= options.deadline {
            tracing::error!(
                "Operation {} did not complete within {}s",
                operation.name,
                options.deadline.as_secs()
            );
            return Err(AppError::Timeout { secs: options.deadline.as_secs() });
        }
        tokio::time::sleep(options.interval).await;
        operation = service.refresh(&operation).await?;
    }

    if let Some(message) = operation.error_message() {
        tracing::error!("Operation {} failed: {}", operation.name, message);
        return Err(AppError::RemoteJob(message.to_string()));
    }
    tracing::info!("Operation {} completed after {:?}", operation.name, started.elapsed());
    Ok(operation)
}

/// Map elapsed time onto the polling progress band. Monotone in `elapsed`.
fn poll_progress(elapsed: Duration, deadline: Duration) -> u8 {
    let span = (POLL_PROGRESS_CEILING - POLL_PROGRESS_FLOOR) as f64;
    let frac = if deadline.is_zero() {
        1.0
    } else {
        (elapsed.as_secs_f64() / deadline.as_secs_f64()).min(1.0)
    };
    POLL_PROGRESS_FLOOR + (frac * span) as u8
}
