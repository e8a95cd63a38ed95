//! `rcqt-kernelcheck` --- operating system and kernel release allow-list check.
//!
//! The host passes a [`PropertyMap`](rcqt_core::PropertyMap) with
//! `os_version` and `kernel_version` allow-lists. [`run`] compares them with
//! the `PRETTY_NAME` from os-release and the running kernel's release, and
//! reports one `[rcqt] kernelcheck <os> <kernel> pass|fail` line to the sink.
//!
//! # Usage
//!
//! ```ignore
//! let outcome = rcqt_kernelcheck::run(&props, &HostSystem::default(), &TracingSink)?;
//! ```

pub mod check;
pub mod error;
pub mod os_release;
pub mod system;

pub use check::{KERNEL_VERSION_KEY, KernelCheckOutcome, OS_VERSION_KEY, run};
pub use error::KernelCheckError;
pub use system::{HostSystem, OS_RELEASE_PATH, SystemInfo};
