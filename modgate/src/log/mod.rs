//! Logging capability handed to every engine component.
//!
//! Components never reach for a process-wide logger. Each one receives an
//! `Arc<dyn Logger>` at construction, so the host decides where messages go:
//!
//! - `TracingLogger`: forwards to the `tracing` crate (production)
//! - `NoOpLogger`: discards everything
//! - `MemoryLogger`: keeps entries in memory so tests can assert on warnings
//!
//! ```
//! use std::sync::Arc;
//! use modgate::log::{Logger, NoOpLogger};
//! use modgate::log_info;
//!
//! let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
//! log_info!(logger, "checking {} mods", 3);
//! ```

mod logger;
mod memory;
mod noop;
mod tracing_adapter;

pub use logger::{LogLevel, Logger};
pub use memory::{LogEntry, MemoryLogger};
pub use noop::NoOpLogger;
pub use tracing_adapter::TracingLogger;
