//! Adapter from [`Logger`] to the `tracing` crate.

use std::fmt::Arguments;

use super::{LogLevel, Logger};

/// Forwards engine messages to `tracing`, so whatever subscriber the host
/// installed (see [`crate::logging::init_logging`]) receives them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        match level {
            LogLevel::Trace => tracing::trace!(target: "modgate", "{}", args),
            LogLevel::Debug => tracing::debug!(target: "modgate", "{}", args),
            LogLevel::Info => tracing::info!(target: "modgate", "{}", args),
            LogLevel::Warn => tracing::warn!(target: "modgate", "{}", args),
            LogLevel::Error => tracing::error!(target: "modgate", "{}", args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_logger_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TracingLogger>();
    }

    #[test]
    fn test_tracing_logger_without_subscriber() {
        let logger: Box<dyn Logger> = Box::new(TracingLogger::new());
        logger.warn(format_args!("no subscriber installed"));
    }
}
