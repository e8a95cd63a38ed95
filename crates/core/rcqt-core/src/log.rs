//! Result sink for check output.
//!
//! Checks never print directly. They hand each formatted line to a
//! [`LogSink`] together with a [`LogLevel`] tag, and the host decides where
//! it goes. [`TracingSink`] forwards into [`tracing`]; [`MemorySink`] keeps
//! everything in memory for tests and embedding hosts.

use std::fmt;
use std::sync::{Mutex, PoisonError};

// ---------------------------------------------------------------------------
// Log levels (lower = more severe)
// ---------------------------------------------------------------------------

/// Severity or category tag attached to every sink message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    /// Error: a check could not run to completion.
    Error = 0,
    /// Warning: a resource was unavailable, the check continued.
    Warn = 1,
    /// Results: the pass/fail or property lines a check exists to produce.
    Results = 2,
    /// Informational: high-level progress messages.
    Info = 3,
    /// Debug: detailed diagnostic information.
    Debug = 4,
    /// Trace: very verbose, low-level tracing.
    Trace = 5,
}

impl LogLevel {
    /// Returns the human-readable name (fixed-width for aligned output).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN ",
            Self::Results => "RESLT",
            Self::Info => "INFO ",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().trim_end())
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Destination for formatted check output.
pub trait LogSink {
    /// Accepts one formatted message tagged with `level`.
    fn log(&self, level: LogLevel, message: &str);
}

impl<S: LogSink + ?Sized> LogSink for &S {
    fn log(&self, level: LogLevel, message: &str) {
        (**self).log(level, message);
    }
}

/// Forwards sink messages to `tracing` events.
///
/// Result lines go to the `rcqt::results` target so a subscriber can route
/// them separately from diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Error => tracing::error!(target: "rcqt", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "rcqt", "{message}"),
            LogLevel::Results => tracing::info!(target: "rcqt::results", "{message}"),
            LogLevel::Info => tracing::info!(target: "rcqt", "{message}"),
            LogLevel::Debug => tracing::debug!(target: "rcqt", "{message}"),
            LogLevel::Trace => tracing::trace!(target: "rcqt", "{message}"),
        }
    }
}

/// Records every message in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything logged so far.
    #[must_use]
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the messages logged at `level`, in order.
    #[must_use]
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: LogLevel, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_are_fixed_width() {
        for level in [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Results,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ] {
            assert_eq!(level.name().len(), 5);
        }
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
    }

    #[test]
    fn severity_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Results < LogLevel::Debug);
    }

    #[test]
    fn memory_sink_filters_by_level() {
        let sink = MemorySink::new();
        sink.log(LogLevel::Results, "[rcqt] a");
        sink.log(LogLevel::Error, "boom");
        sink.log(LogLevel::Results, "[rcqt] b");

        assert_eq!(sink.messages(LogLevel::Results), ["[rcqt] a", "[rcqt] b"]);
        assert_eq!(sink.messages(LogLevel::Error), ["boom"]);
        assert_eq!(sink.entries().len(), 3);
    }

    #[test]
    fn sink_by_reference() {
        let sink = MemorySink::new();
        let by_ref: &dyn LogSink = &sink;
        (&by_ref).log(LogLevel::Info, "hello");
        assert_eq!(sink.messages(LogLevel::Info), ["hello"]);
    }
}
