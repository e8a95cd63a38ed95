//! Device handle model: addresses, BARs, capabilities and register access.
//!
//! The decoders never own a device. They are handed something implementing
//! [`PciDevice`] and only read from it, apart from the select/data write of
//! the power budgeting capability.

use core::fmt;
use core::str::FromStr;
use std::path::Path;

/// PCI domain/bus/device/function address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PciAddress {
    /// Domain (segment) number.
    pub domain: u16,
    /// Bus number (0-255).
    pub bus: u8,
    /// Device number (0-31).
    pub device: u8,
    /// Function number (0-7).
    pub function: u8,
}

impl PciAddress {
    /// Creates an address.
    #[must_use]
    pub const fn new(domain: u16, bus: u8, device: u8, function: u8) -> Self {
        Self {
            domain,
            bus,
            device,
            function,
        }
    }
}

impl fmt::Display for PciAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04x}:{:02x}:{:02x}.{}",
            self.domain, self.bus, self.device, self.function
        )
    }
}

/// Error returned when a string is not a `dddd:bb:dd.f` or `bb:dd.f` address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid PCI address `{0}`")]
pub struct AddressParseError(pub String);

impl FromStr for PciAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || AddressParseError(s.to_owned());

        let (slot, function) = s.rsplit_once('.').ok_or_else(err)?;
        let mut parts = slot.rsplitn(3, ':');
        let device = parts.next().ok_or_else(err)?;
        let bus = parts.next().ok_or_else(err)?;
        let domain = parts.next().unwrap_or("0");

        let domain = u16::from_str_radix(domain, 16).map_err(|_| err())?;
        let bus = u8::from_str_radix(bus, 16).map_err(|_| err())?;
        let device = u8::from_str_radix(device, 16).map_err(|_| err())?;
        let function = function.parse::<u8>().map_err(|_| err())?;

        if device > 0x1F || function > 7 {
            return Err(err());
        }

        Ok(Self {
            domain,
            bus,
            device,
            function,
        })
    }
}

/// Decoded PCI Base Address Register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PciBar {
    /// Memory-mapped BAR.
    Memory {
        /// Base physical address.
        base: u64,
        /// Size in bytes.
        size: u64,
        /// Whether the region is prefetchable.
        prefetchable: bool,
        /// Whether this is a 64-bit BAR (consumes two BAR slots).
        is_64bit: bool,
    },
    /// I/O port BAR.
    Io {
        /// Base I/O port address.
        base: u64,
        /// Size in bytes.
        size: u64,
    },
    /// BAR slot is unused or consumed by the upper half of a 64-bit BAR.
    Unused,
}

impl PciBar {
    /// Returns `true` for a memory BAR with a non-zero base and size.
    #[must_use]
    pub fn is_populated_memory(&self) -> bool {
        matches!(*self, Self::Memory { base, size, .. } if base != 0 && size != 0)
    }
}

/// Which list a capability lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityType {
    /// Conventional list, rooted at the Capabilities Pointer (0x34).
    Normal,
    /// PCI Express extended list, rooted at 0x100.
    Extended,
}

/// One entry of a device's capability list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    /// Capability ID (8-bit for normal, 16-bit for extended capabilities).
    pub id: u16,
    /// Which list the capability came from.
    pub kind: CapabilityType,
    /// Config-space offset of the capability header.
    pub offset: u32,
}

impl Capability {
    /// Creates a capability entry.
    #[must_use]
    pub const fn new(id: u16, kind: CapabilityType, offset: u32) -> Self {
        Self { id, kind, offset }
    }
}

/// How a device's configuration space is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMethod {
    /// Linux sysfs (`/sys/bus/pci`).
    SysBusPci,
    /// Linux procfs (`/proc/bus/pci`).
    ProcBusPci,
    /// Captured configuration-space dump.
    Dump,
}

/// Static identity of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PciDeviceInfo {
    /// Domain/bus/device/function address.
    pub address: PciAddress,
    /// Vendor ID.
    pub vendor_id: u16,
    /// Device ID.
    pub device_id: u16,
    /// Base Address Registers.
    pub bars: [PciBar; 6],
}

impl PciDeviceInfo {
    /// Creates identity info with every BAR unused.
    #[must_use]
    pub const fn new(address: PciAddress, vendor_id: u16, device_id: u16) -> Self {
        Self {
            address,
            vendor_id,
            device_id,
            bars: [PciBar::Unused; 6],
        }
    }
}

/// Byte-granular configuration-space access.
///
/// Offsets are absolute within the function's configuration space. Multi-byte
/// reads are little-endian; the defaults compose them from [`read_u8`].
///
/// [`read_u8`]: ConfigSpace::read_u8
pub trait ConfigSpace {
    /// Reads an 8-bit register.
    fn read_u8(&self, offset: u32) -> u8;

    /// Reads a 16-bit register.
    fn read_u16(&self, offset: u32) -> u16 {
        u16::from_le_bytes([self.read_u8(offset), self.read_u8(offset + 1)])
    }

    /// Reads a 32-bit register.
    fn read_u32(&self, offset: u32) -> u32 {
        u32::from_le_bytes([
            self.read_u8(offset),
            self.read_u8(offset + 1),
            self.read_u8(offset + 2),
            self.read_u8(offset + 3),
        ])
    }

    /// Writes an 8-bit register.
    fn write_u8(&mut self, offset: u32, value: u8);
}

/// A device handle as seen by the decoders.
pub trait PciDevice: ConfigSpace {
    /// Returns the device's static identity.
    fn info(&self) -> &PciDeviceInfo;

    /// Returns the capability list, in list order.
    fn capabilities(&self) -> &[Capability];

    /// Returns how configuration space is reached.
    fn access_method(&self) -> AccessMethod;

    /// Returns the sysfs PCI root (e.g. `/sys/bus/pci`), if known.
    fn sysfs_path(&self) -> Option<&Path> {
        None
    }
}
