//! Background execution context for I/O-bound work
//!
//! An [`IoDispatcher`] either borrows the runtime the caller is already in
//! or owns a dedicated multi-threaded runtime sized for blocking I/O. The
//! process-wide dispatcher behind [`IoDispatcher::global`] is built lazily
//! from [`DispatcherConfig`] and lives for the rest of the process.

use crate::config::DispatcherConfig;
use crate::error::{LifescopeError, Result};
use once_cell::sync::OnceCell;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::{debug, info};

static GLOBAL: OnceCell<IoDispatcher> = OnceCell::new();

/// Owned runtime that tears itself down without blocking
///
/// Dropping a plain `Runtime` from async code panics; this drops it from
/// anywhere by shutting it down in the background.
#[derive(Debug)]
struct OwnedRuntime(Option<Runtime>);

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.0.take() {
            runtime.shutdown_background();
        }
    }
}

/// Handle to the runtime background work is scheduled on
#[derive(Debug, Clone)]
pub struct IoDispatcher {
    handle: Handle,
    runtime: Option<Arc<OwnedRuntime>>,
    name: String,
}

impl IoDispatcher {
    /// Build a dedicated runtime from `config`
    ///
    /// The runtime shuts down once the last clone is dropped; in-flight work
    /// is not awaited.
    pub fn new(config: &DispatcherConfig) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(config.worker_threads.max(1))
            .max_blocking_threads(config.max_blocking_threads.max(1))
            .thread_name(config.thread_name.clone())
            .thread_keep_alive(Duration::from_millis(config.thread_keep_alive_ms))
            .enable_all()
            .build()
            .map_err(|e| LifescopeError::runtime(format!("Failed to build I/O runtime: {}", e)))?;

        info!(
            "I/O dispatcher '{}' started - workers: {}, max_blocking: {}",
            config.thread_name, config.worker_threads, config.max_blocking_threads
        );

        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(Arc::new(OwnedRuntime(Some(runtime)))),
            name: config.thread_name.clone(),
        })
    }

    /// Borrow the runtime the caller is running on
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| LifescopeError::runtime(format!("No ambient tokio runtime: {}", e)))?;
        Ok(Self {
            handle,
            runtime: None,
            name: "current".to_string(),
        })
    }

    /// The process-wide dispatcher, built with default sizing on first use
    pub fn global() -> Result<&'static Self> {
        GLOBAL.get_or_try_init(|| Self::new(&DispatcherConfig::default()))
    }

    /// Install the process-wide dispatcher with explicit sizing
    ///
    /// Fails if the global dispatcher has already been built.
    pub fn install_global(config: &DispatcherConfig) -> Result<&'static Self> {
        let mut installed = false;
        let dispatcher = GLOBAL.get_or_try_init(|| {
            installed = true;
            Self::new(config)
        })?;
        if installed {
            Ok(dispatcher)
        } else {
            Err(LifescopeError::config(
                "global I/O dispatcher is already initialized",
            ))
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Whether this dispatcher owns its runtime
    pub const fn is_dedicated(&self) -> bool {
        self.runtime.is_some()
    }

    /// Schedule a future on the dispatcher's workers
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }

    /// Run a blocking closure on the dispatcher's blocking pool
    pub fn spawn_blocking<F, R>(&self, f: F) -> JoinHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.handle.spawn_blocking(f)
    }

    /// Release this clone, tearing down an owned runtime if it was the last
    ///
    /// Safe to call from async code. Does nothing for borrowed runtimes or
    /// while other clones are alive.
    pub fn shutdown(self) {
        if self.runtime.as_ref().is_some_and(|rt| Arc::strong_count(rt) == 1) {
            debug!("I/O dispatcher '{}' shutting down", self.name);
        }
    }
}
