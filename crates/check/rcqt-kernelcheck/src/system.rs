//! Where the check learns about the running system.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use nix::sys::utsname::uname;

/// Default location of the os-release file.
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Source of the installed OS description and running kernel release.
pub trait SystemInfo {
    /// Returns the full text of the os-release file.
    ///
    /// Invalid UTF-8 is replaced rather than rejected, so a stray byte on
    /// one line does not hide the others.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    fn os_release(&self) -> io::Result<String>;

    /// Returns the running kernel's release string (`uname -r`).
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel cannot be queried.
    fn kernel_release(&self) -> io::Result<String>;
}

/// The machine this process runs on.
#[derive(Debug, Clone)]
pub struct HostSystem {
    os_release_path: PathBuf,
}

impl HostSystem {
    /// Reads os-release from `path` instead of [`OS_RELEASE_PATH`].
    #[must_use]
    pub fn with_os_release(path: impl Into<PathBuf>) -> Self {
        Self {
            os_release_path: path.into(),
        }
    }

    /// Returns the os-release path in use.
    #[must_use]
    pub fn os_release_path(&self) -> &Path {
        &self.os_release_path
    }
}

impl Default for HostSystem {
    fn default() -> Self {
        Self::with_os_release(OS_RELEASE_PATH)
    }
}

impl SystemInfo for HostSystem {
    fn os_release(&self) -> io::Result<String> {
        let bytes = fs::read(&self.os_release_path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn kernel_release(&self) -> io::Result<String> {
        let uts = uname()?;
        Ok(uts.release().to_string_lossy().into_owned())
    }
}
