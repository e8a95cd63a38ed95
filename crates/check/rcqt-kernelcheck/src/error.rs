//! Error types for the kernel check.

/// A check invocation that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KernelCheckError {
    /// `os_version` was given without a matching `kernel_version`.
    #[error("kernel version field missing")]
    MissingKernelVersion,
}
