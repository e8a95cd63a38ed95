//! Devices reached through Linux sysfs (`/sys/bus/pci`).
//!
//! Each function exposes its configuration space as
//! `<base>/devices/<dddd:bb:dd.f>/config` and its BARs, already sized by the
//! kernel, as `.../resource`. Unprivileged readers only see the first 64
//! bytes of `config`, in which case the capability list comes back empty and
//! every decoder falls back to its default.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use bitflags::bitflags;

use crate::caps::walk_capabilities;
use crate::device::{
    AccessMethod, Capability, ConfigSpace, PciAddress, PciBar, PciDevice, PciDeviceInfo,
};
use crate::mem::ConfigImage;
use crate::regs::header;

/// Default sysfs PCI root.
pub const DEFAULT_SYSFS_PATH: &str = "/sys/bus/pci";

/// Smallest readable `config` file (the unprivileged view).
const MIN_CONFIG_LEN: usize = 64;

bitflags! {
    /// `IORESOURCE_*` flags from the third column of a sysfs `resource` file.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ResourceFlags: u64 {
        /// I/O port space.
        const IO = 0x0000_0100;
        /// Memory space.
        const MEM = 0x0000_0200;
        /// Prefetchable memory.
        const PREFETCH = 0x0000_2000;
        /// 64-bit memory BAR.
        const MEM_64 = 0x0010_0000;
    }
}

/// Errors opening a sysfs-backed device.
#[derive(Debug, thiserror::Error)]
pub enum SysfsError {
    /// A sysfs file could not be read or opened.
    #[error("{path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
    /// The `config` file is shorter than the standard header.
    #[error("{path}: only {len} bytes of configuration space readable")]
    ShortConfig {
        /// The `config` file.
        path: PathBuf,
        /// Bytes actually read.
        len: usize,
    },
}

impl SysfsError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A device handle backed by sysfs files.
///
/// Register reads go to the `config` file on every call, so the power
/// budgeting select/data sequence observes the hardware. The write needs
/// the file to be writable (usually root); otherwise it is dropped with a
/// warning.
#[derive(Debug)]
pub struct SysfsDevice {
    info: PciDeviceInfo,
    caps: Vec<Capability>,
    config: File,
    writable: bool,
    base: PathBuf,
}

impl SysfsDevice {
    /// Opens the function at `address` under the sysfs root `base`.
    ///
    /// # Errors
    ///
    /// Returns [`SysfsError`] if the `config` file cannot be opened or read,
    /// or holds less than the 64-byte header.
    pub fn open(base: impl AsRef<Path>, address: PciAddress) -> Result<Self, SysfsError> {
        let base = base.as_ref();
        let dir = device_dir(base, &address);
        let config_path = dir.join("config");

        let (config, writable) = match OpenOptions::new().read(true).write(true).open(&config_path)
        {
            Ok(file) => (file, true),
            Err(err) => {
                tracing::debug!(path = %config_path.display(), %err, "config space is read-only");
                let file = File::open(&config_path).map_err(|e| SysfsError::io(&config_path, e))?;
                (file, false)
            }
        };

        let bytes = fs::read(&config_path).map_err(|e| SysfsError::io(&config_path, e))?;
        if bytes.len() < MIN_CONFIG_LEN {
            return Err(SysfsError::ShortConfig {
                path: config_path,
                len: bytes.len(),
            });
        }

        let snapshot = ConfigImage::from_bytes(bytes);
        let config_len = u32::try_from(snapshot.len()).unwrap_or(u32::MAX);
        let caps = walk_capabilities(&snapshot, config_len);

        let mut info = PciDeviceInfo::new(
            address,
            snapshot.read_u16(header::VENDOR_ID),
            snapshot.read_u16(header::DEVICE_ID),
        );
        info.bars = read_bars(&dir.join("resource"));

        tracing::debug!(
            %address,
            vendor = info.vendor_id,
            device = info.device_id,
            config_len,
            caps = caps.len(),
            "opened sysfs device"
        );

        Ok(Self {
            info,
            caps,
            config,
            writable,
            base: base.to_path_buf(),
        })
    }

    /// Returns `true` if configuration-space writes reach the device.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    fn read_at<const N: usize>(&self, offset: u32) -> [u8; N] {
        let mut buf = [0u8; N];
        if let Err(err) = self.config.read_exact_at(&mut buf, u64::from(offset)) {
            tracing::warn!(address = %self.info.address, offset, %err, "config read failed");
            return [0xFF; N];
        }
        buf
    }
}

impl ConfigSpace for SysfsDevice {
    fn read_u8(&self, offset: u32) -> u8 {
        self.read_at::<1>(offset)[0]
    }

    fn read_u16(&self, offset: u32) -> u16 {
        u16::from_le_bytes(self.read_at(offset))
    }

    fn read_u32(&self, offset: u32) -> u32 {
        u32::from_le_bytes(self.read_at(offset))
    }

    fn write_u8(&mut self, offset: u32, value: u8) {
        if !self.writable {
            tracing::warn!(address = %self.info.address, offset, "config space not writable");
            return;
        }
        if let Err(err) = self.config.write_all_at(&[value], u64::from(offset)) {
            tracing::warn!(address = %self.info.address, offset, %err, "config write failed");
        }
    }
}

impl PciDevice for SysfsDevice {
    fn info(&self) -> &PciDeviceInfo {
        &self.info
    }

    fn capabilities(&self) -> &[Capability] {
        &self.caps
    }

    fn access_method(&self) -> AccessMethod {
        AccessMethod::SysBusPci
    }

    fn sysfs_path(&self) -> Option<&Path> {
        Some(&self.base)
    }
}

/// Lists every function under `<base>/devices`, sorted by address.
///
/// # Errors
///
/// Returns [`SysfsError::Io`] if the directory cannot be read.
pub fn enumerate(base: impl AsRef<Path>) -> Result<Vec<PciAddress>, SysfsError> {
    let devices = base.as_ref().join("devices");
    let entries = fs::read_dir(&devices).map_err(|e| SysfsError::io(&devices, e))?;

    let mut addresses: Vec<PciAddress> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
        .collect();
    addresses.sort_unstable();

    Ok(addresses)
}

fn device_dir(base: &Path, address: &PciAddress) -> PathBuf {
    base.join("devices").join(address.to_string())
}

/// Reads the six BARs from a sysfs `resource` file.
///
/// A missing or unreadable file leaves every BAR unused.
fn read_bars(path: &Path) -> [PciBar; 6] {
    let mut bars = [PciBar::Unused; 6];

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "cannot read BAR resources");
            return bars;
        }
    };

    for (slot, line) in bars.iter_mut().zip(text.lines()) {
        *slot = parse_resource_line(line).unwrap_or(PciBar::Unused);
    }

    bars
}

/// Parses one `<start> <end> <flags>` line of a `resource` file.
fn parse_resource_line(line: &str) -> Option<PciBar> {
    let mut fields = line.split_whitespace().map(parse_hex);
    let start = fields.next()??;
    let end = fields.next()??;
    let flags = ResourceFlags::from_bits_truncate(fields.next()??);

    if start == 0 && end == 0 {
        return Some(PciBar::Unused);
    }
    let size = end.checked_sub(start)?.checked_add(1)?;

    if flags.contains(ResourceFlags::IO) {
        Some(PciBar::Io { base: start, size })
    } else if flags.contains(ResourceFlags::MEM) {
        Some(PciBar::Memory {
            base: start,
            size,
            prefetchable: flags.contains(ResourceFlags::PREFETCH),
            is_64bit: flags.contains(ResourceFlags::MEM_64),
        })
    } else {
        Some(PciBar::Unused)
    }
}

fn parse_hex(field: &str) -> Option<u64> {
    let digits = field.strip_prefix("0x").unwrap_or(field);
    u64::from_str_radix(digits, 16).ok()
}
