//! Logger that discards everything.

use std::fmt::Arguments;

use super::{LogLevel, Logger};

/// Discards all messages. Handy for tests and for hosts that only care
/// about the returned reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    #[inline]
    fn log(&self, _level: LogLevel, _args: Arguments<'_>) {}
}
