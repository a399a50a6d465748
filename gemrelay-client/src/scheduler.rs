//! Deferred task scheduling.
//!
//! Retries never sleep inline. A chain hands its next attempt to a
//! [`Scheduler`], which decides where and when it runs.

use futures::future::BoxFuture;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::error;

/// A unit of deferred work.
pub type Task = BoxFuture<'static, ()>;

/// Runs tasks after a delay.
pub trait Scheduler: Send + Sync {
    /// Runs `task` once `delay` has elapsed. Must not block the caller.
    fn schedule_after(&self, delay: Duration, task: Task);

    /// Runs `task` as soon as possible.
    fn schedule(&self, task: Task) {
        self.schedule_after(Duration::ZERO, task);
    }
}

/// Scheduler backed by the tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    handle: Option<Handle>,
}

impl TokioScheduler {
    /// Creates a scheduler bound to the current runtime, if any.
    ///
    /// Without a runtime at construction time the runtime is looked up
    /// again whenever a task is scheduled.
    pub fn new() -> Self {
        Self {
            handle: Handle::try_current().ok(),
        }
    }

    /// Creates a scheduler bound to a specific runtime.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, task: Task) {
        let Some(handle) = self.handle.clone().or_else(|| Handle::try_current().ok()) else {
            error!("No tokio runtime available, dropping scheduled task");
            return;
        };

        handle.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            task.await;
        });
    }
}
