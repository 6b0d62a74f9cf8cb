//! # Lifescope
//!
//! Two small building blocks for application code:
//!
//! - **Fixed-precision formatting**: render `f64`/`f32` values with an exact
//!   number of fractional digits (`format_double_x_bit`, `value.format_x_bit`).
//! - **Lifecycle-scoped background work**: launch futures or blocking
//!   closures on an I/O dispatcher, cancelled automatically when their
//!   owner's lifecycle is destroyed, each with its own failure boundary.
//!
//! ## Architecture
//!
//! - `format`: fixed-point number formatting
//! - `lifecycle`: lifecycle states, owners and their cancellation scope
//! - `dispatcher`: the background runtime work is scheduled on
//! - `runner`: lifecycle-scoped, supervised task launching
//! - `files`: local file and path helpers
//! - `config`: YAML configuration
//! - `logging`: structured logging and tracing
//! - `error`: crate error type

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod files;
pub mod format;
pub mod lifecycle;
pub mod logging;
pub mod runner;

// Re-export commonly used types
pub use config::Config;
pub use dispatcher::IoDispatcher;
pub use error::{LifescopeError, Result};
pub use format::{FixedPoint, FormatXBit, format_double_x_bit, format_float_x_bit};
pub use lifecycle::{Lifecycle, LifecycleOwner, LifecycleState};
pub use runner::{ScopedBackgroundRunner, ScopedTask, TaskOutcome, run_scoped_background};
