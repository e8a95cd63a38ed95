//! Shared plumbing for rcqt checks.
//!
//! - [`log`] -- the result sink every check reports through, with severity
//!   tags and a [`tracing`] bridge.
//! - [`property`] -- the flat string property map a host hands to a check,
//!   plus comma-list splitting.

pub mod log;
pub mod property;

pub use log::{LogLevel, LogSink, MemorySink, TracingSink};
pub use property::{PropertyMap, split_list};
