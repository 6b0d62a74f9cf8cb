//! Lifecycle-scoped background work
//!
//! [`ScopedBackgroundRunner::launch`] schedules a future on an
//! [`IoDispatcher`] and returns immediately. The work is tied to its
//! owner's [`Lifecycle`](crate::lifecycle::Lifecycle): destroying the owner
//! cancels it at its next suspension point, and launching against an
//! already destroyed owner never polls the work at all.
//!
//! Every launch gets its own failure boundary. The work runs in a task of
//! its own under a supervising task; a panic or returned error is captured
//! there and handed to the runner's [`FailureHandler`] without touching
//! sibling tasks or the caller.

use crate::dispatcher::IoDispatcher;
use crate::error::Result;
use crate::lifecycle::LifecycleOwner;
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

mod outcome;

pub use outcome::{FailureHandler, FailureKind, TaskFailure, TaskOutcome, TaskResult};

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Schedules work against lifecycle owners
#[derive(Clone)]
pub struct ScopedBackgroundRunner {
    dispatcher: IoDispatcher,
    on_failure: FailureHandler,
}

impl fmt::Debug for ScopedBackgroundRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedBackgroundRunner")
            .field("dispatcher", &self.dispatcher.name())
            .finish_non_exhaustive()
    }
}

impl ScopedBackgroundRunner {
    /// Runner on `dispatcher` that logs unhandled failures
    pub fn new(dispatcher: IoDispatcher) -> Self {
        Self {
            dispatcher,
            on_failure: Arc::new(log_failure),
        }
    }

    /// Runner on the process-wide I/O dispatcher
    pub fn global() -> Result<Self> {
        Ok(Self::new(IoDispatcher::global()?.clone()))
    }

    /// Runner on the caller's own runtime
    pub fn current() -> Result<Self> {
        Ok(Self::new(IoDispatcher::current()?))
    }

    /// Replace the default (logging) failure handler
    #[must_use]
    pub fn with_failure_handler<H>(mut self, handler: H) -> Self
    where
        H: Fn(&TaskFailure) + Send + Sync + 'static,
    {
        self.on_failure = Arc::new(handler);
        self
    }

    pub const fn dispatcher(&self) -> &IoDispatcher {
        &self.dispatcher
    }

    /// Schedule `work` against `owner` and return without waiting
    ///
    /// The returned handle may be dropped; the work keeps running.
    pub fn launch<O, F>(&self, owner: &O, work: F) -> ScopedTask
    where
        O: LifecycleOwner + ?Sized,
        F: Future + Send + 'static,
        F::Output: TaskResult + Send + 'static,
    {
        let handle = self.dispatcher.handle().clone();
        self.schedule(owner, move |_| handle.spawn(work))
    }

    /// Schedule a blocking closure against `owner` on the blocking pool
    ///
    /// Blocking code cannot be interrupted; `f` receives the task's token
    /// and should poll `is_cancelled()` between steps. Cancellation is
    /// reported as soon as it is requested.
    pub fn launch_blocking<O, F, R>(&self, owner: &O, f: F) -> ScopedTask
    where
        O: LifecycleOwner + ?Sized,
        F: FnOnce(CancellationToken) -> R + Send + 'static,
        R: TaskResult + Send + 'static,
    {
        let handle = self.dispatcher.handle().clone();
        self.schedule(owner, move |token| handle.spawn_blocking(move || f(token)))
    }

    fn schedule<O, S, R>(&self, owner: &O, start: S) -> ScopedTask
    where
        O: LifecycleOwner + ?Sized,
        S: FnOnce(CancellationToken) -> JoinHandle<R> + Send + 'static,
        R: TaskResult + Send + 'static,
    {
        let lifecycle = owner.lifecycle();
        let id = NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed);
        let owner_name = lifecycle.name().to_string();
        let token = lifecycle.cancellation_token();
        let logger = get_logger_with_context(
            LogContext::new("runner")
                .with_owner(&owner_name)
                .with_task_id(id)
                .with_field("dispatcher", self.dispatcher.name().to_string()),
        );

        if lifecycle.is_destroyed() {
            logger.debug("Owner already destroyed; skipping work");
            return ScopedTask {
                id,
                owner: owner_name,
                token,
                handle: None,
            };
        }

        logger.debug("Launching scoped background work");
        let supervisor = self.dispatcher.spawn(supervise(
            id,
            owner_name.clone(),
            token.clone(),
            start,
            Arc::clone(&self.on_failure),
            logger,
        ));

        ScopedTask {
            id,
            owner: owner_name,
            token,
            handle: Some(supervisor),
        }
    }
}

async fn supervise<S, R>(
    id: u64,
    owner: String,
    token: CancellationToken,
    start: S,
    on_failure: FailureHandler,
    logger: StructuredLogger,
) -> TaskOutcome
where
    S: FnOnce(CancellationToken) -> JoinHandle<R>,
    R: TaskResult + Send + 'static,
{
    // Destroyed between scheduling and the supervisor's first poll
    if token.is_cancelled() {
        logger.debug("Owner destroyed before work started; skipping");
        return TaskOutcome::Skipped;
    }

    // The work's own task is only created once the supervisor runs
    let mut work = start(token.clone());
    logger.trace("Supervising scoped background work");

    let joined = tokio::select! {
        biased;
        () = token.cancelled() => {
            work.abort();
            logger.debug("Scoped background work cancelled");
            return TaskOutcome::Cancelled;
        }
        joined = &mut work => joined,
    };

    let failure = match joined {
        Ok(result) => match result.into_task_result() {
            Ok(()) => {
                logger.debug("Scoped background work completed");
                return TaskOutcome::Completed;
            }
            Err(message) => TaskFailure::from_error(id, &owner, message),
        },
        Err(e) if e.is_panic() => TaskFailure::from_panic(id, &owner, &*e.into_panic()),
        Err(_) => {
            // Only a runtime shutdown aborts the work behind our back
            logger.warn("Scoped background work aborted by runtime shutdown");
            return TaskOutcome::Cancelled;
        }
    };

    on_failure(&failure);
    TaskOutcome::Failed(failure)
}

fn log_failure(failure: &TaskFailure) {
    get_logger_with_context(
        LogContext::new("runner")
            .with_owner(&failure.owner)
            .with_task_id(failure.task_id),
    )
    .error(&format!("Unhandled failure in background work: {}", failure));
}

/// Handle to one launched unit of work
///
/// Dropping the handle detaches it; the work keeps running.
#[derive(Debug)]
pub struct ScopedTask {
    id: u64,
    owner: String,
    token: CancellationToken,
    handle: Option<JoinHandle<TaskOutcome>>,
}

impl ScopedTask {
    pub const fn id(&self) -> u64 {
        self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Whether the launch was skipped because the owner was destroyed
    pub const fn was_skipped(&self) -> bool {
        self.handle.is_none()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancel this task only; the owner and its other tasks are unaffected
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the final outcome
    pub async fn join(self) -> TaskOutcome {
        let Some(handle) = self.handle else {
            return TaskOutcome::Skipped;
        };
        match handle.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => {
                // The failure handler itself panicked
                TaskOutcome::Failed(TaskFailure::from_panic(
                    self.id,
                    &self.owner,
                    &*e.into_panic(),
                ))
            }
            Err(_) => TaskOutcome::Cancelled,
        }
    }
}

/// Launch `work` against `owner` on the process-wide I/O dispatcher
pub fn run_scoped_background<O, F>(owner: &O, work: F) -> Result<ScopedTask>
where
    O: LifecycleOwner + ?Sized,
    F: Future + Send + 'static,
    F::Output: TaskResult + Send + 'static,
{
    Ok(ScopedBackgroundRunner::global()?.launch(owner, work))
}
