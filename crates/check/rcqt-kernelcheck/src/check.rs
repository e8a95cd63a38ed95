//! The OS / kernel allow-list check.

use std::fmt;

use rcqt_core::{LogLevel, LogSink, PropertyMap, split_list};

use crate::error::KernelCheckError;
use crate::os_release::{line_value, pretty_name_lines};
use crate::system::SystemInfo;

/// Property holding the comma-separated allowed OS pretty names.
pub const OS_VERSION_KEY: &str = "os_version";
/// Property holding the comma-separated allowed kernel releases.
pub const KERNEL_VERSION_KEY: &str = "kernel_version";

const LIST_DELIM: &str = ",";

/// What the check found on the system and how it compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelCheckOutcome {
    /// Installed OS pretty name, `""` if it could not be determined.
    pub os_actual: String,
    /// Running kernel release, `""` if it could not be determined.
    pub kernel_actual: String,
    /// `os_actual` is on the OS allow-list.
    pub os_matched: bool,
    /// `kernel_actual` is on the kernel allow-list.
    pub kernel_matched: bool,
}

impl KernelCheckOutcome {
    /// Both the OS and the kernel are allowed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.os_matched && self.kernel_matched
    }

    /// The line reported at [`LogLevel::Results`].
    #[must_use]
    pub fn result_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for KernelCheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[rcqt] kernelcheck {} {} {}",
            self.os_actual,
            self.kernel_actual,
            if self.passed() { "pass" } else { "fail" }
        )
    }
}

/// Checks the installed OS and running kernel against allow-lists.
///
/// Nothing happens without an `os_version` property: the result is
/// `Ok(None)` and the sink is left untouched. Otherwise `kernel_version` is
/// required. Both values are comma-separated lists compared byte for byte,
/// without trimming, against the os-release `PRETTY_NAME` and the kernel
/// release. The result line goes to `sink` at [`LogLevel::Results`].
///
/// An unreadable os-release, a missing `PRETTY_NAME` or an unavailable
/// kernel release is reported at [`LogLevel::Warn`] and compared as `""`.
///
/// # Errors
///
/// [`KernelCheckError::MissingKernelVersion`] if `os_version` is set and
/// `kernel_version` is not. No result line is emitted.
pub fn run(
    props: &PropertyMap,
    system: &impl SystemInfo,
    sink: &dyn LogSink,
) -> Result<Option<KernelCheckOutcome>, KernelCheckError> {
    let Some(os_versions) = props.get(OS_VERSION_KEY) else {
        tracing::debug!("no os_version property, kernel check skipped");
        return Ok(None);
    };
    let Some(kernel_versions) = props.get(KERNEL_VERSION_KEY) else {
        let err = KernelCheckError::MissingKernelVersion;
        tracing::error!(%err, "kernel check aborted");
        sink.log(LogLevel::Error, &err.to_string());
        return Err(err);
    };

    let os_allowed = split_list(os_versions, LIST_DELIM);
    let kernel_allowed = split_list(kernel_versions, LIST_DELIM);

    let (os_actual, os_matched) = installed_os(system, &os_allowed, sink);

    let kernel_actual = system.kernel_release().unwrap_or_else(|err| {
        tracing::warn!(%err, "uname failed");
        sink.log(LogLevel::Warn, "Unable to read kernel version");
        String::new()
    });
    let kernel_matched = kernel_allowed.contains(&kernel_actual.as_str());

    let outcome = KernelCheckOutcome {
        os_actual,
        kernel_actual,
        os_matched,
        kernel_matched,
    };
    tracing::debug!(
        os = %outcome.os_actual,
        kernel = %outcome.kernel_actual,
        os_matched,
        kernel_matched,
        "kernel check evaluated"
    );
    sink.log(LogLevel::Results, &outcome.result_line());

    Ok(Some(outcome))
}

/// Scans os-release for a `PRETTY_NAME` on the allow-list.
///
/// Stops at the first allowed value; otherwise the last value seen is
/// reported.
fn installed_os(
    system: &impl SystemInfo,
    allowed: &[&str],
    sink: &dyn LogSink,
) -> (String, bool) {
    let text = system.os_release().unwrap_or_else(|err| {
        tracing::warn!(%err, "cannot read os-release");
        String::new()
    });

    let mut actual = None;
    for line in pretty_name_lines(&text) {
        let value = line_value(line);
        actual = Some(value);
        if allowed.contains(&value) {
            return (value.to_owned(), true);
        }
    }

    match actual {
        Some(value) => (value.to_owned(), false),
        None => {
            sink.log(LogLevel::Warn, "Unable to locate actual OS installed");
            (String::new(), false)
        }
    }
}
