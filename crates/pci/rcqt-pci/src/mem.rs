//! In-memory configuration space and device handle.
//!
//! [`ConfigImage`] is a plain byte image of configuration space.
//! [`MemDevice`] wraps one with an explicit capability list, BAR table and
//! access method, which is enough to run every decoder without hardware:
//! unit tests build them by hand, hosts can build them from captured dumps.

use std::path::{Path, PathBuf};

use crate::caps::walk_capabilities;
use crate::device::{
    AccessMethod, Capability, CapabilityType, ConfigSpace, PciAddress, PciBar, PciDevice,
    PciDeviceInfo,
};
use crate::regs::{header, pwr};

/// A little-endian byte image of configuration space.
///
/// Reads past the end return all-ones, like a read from an absent function.
/// Writes past the end are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigImage {
    bytes: Vec<u8>,
}

impl ConfigImage {
    /// Creates a zeroed 256-byte conventional configuration space.
    #[must_use]
    pub fn conventional() -> Self {
        Self::zeroed(header::CONFIG_SPACE_SIZE as usize)
    }

    /// Creates a zeroed 4 KiB PCI Express configuration space.
    #[must_use]
    pub fn extended() -> Self {
        Self::zeroed(header::EXT_CONFIG_SPACE_SIZE as usize)
    }

    fn zeroed(len: usize) -> Self {
        Self {
            bytes: vec![0; len],
        }
    }

    /// Wraps raw configuration-space bytes.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Returns the image length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the image holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Stores an 8-bit value.
    pub fn set_u8(&mut self, offset: u32, value: u8) {
        if let Some(b) = self.bytes.get_mut(offset as usize) {
            *b = value;
        }
    }

    /// Stores a 16-bit little-endian value.
    pub fn set_u16(&mut self, offset: u32, value: u16) {
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            self.set_u8(offset + i as u32, b);
        }
    }

    /// Stores a 32-bit little-endian value.
    pub fn set_u32(&mut self, offset: u32, value: u32) {
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            self.set_u8(offset + i as u32, b);
        }
    }
}

impl ConfigSpace for ConfigImage {
    fn read_u8(&self, offset: u32) -> u8 {
        self.bytes.get(offset as usize).copied().unwrap_or(0xFF)
    }

    fn write_u8(&mut self, offset: u32, value: u8) {
        self.set_u8(offset, value);
    }
}

/// Power budgeting rows served through the Data Select / Data pair.
#[derive(Debug, Clone)]
struct PowerBudget {
    cap_offset: u32,
    entries: Vec<u32>,
}

impl PowerBudget {
    /// Data register value for a Data Select index; 0 past the last row.
    fn data(&self, index: u8) -> u32 {
        self.entries.get(usize::from(index)).copied().unwrap_or(0)
    }
}

/// A device handle backed by a [`ConfigImage`].
#[derive(Debug, Clone)]
pub struct MemDevice {
    info: PciDeviceInfo,
    image: ConfigImage,
    caps: Vec<Capability>,
    access: AccessMethod,
    sysfs_path: Option<PathBuf>,
    power_budget: Option<PowerBudget>,
    writes: Vec<(u32, u8)>,
}

impl MemDevice {
    /// Creates a device with a zeroed 4 KiB image and an empty capability list.
    #[must_use]
    pub fn new(address: PciAddress, vendor_id: u16, device_id: u16) -> Self {
        let mut image = ConfigImage::extended();
        image.set_u16(header::VENDOR_ID, vendor_id);
        image.set_u16(header::DEVICE_ID, device_id);

        Self {
            info: PciDeviceInfo::new(address, vendor_id, device_id),
            image,
            caps: Vec::new(),
            access: AccessMethod::Dump,
            sysfs_path: None,
            power_budget: None,
            writes: Vec::new(),
        }
    }

    /// Creates a device from a captured image.
    ///
    /// Vendor and device IDs come from the header and the capability list is
    /// walked from the image itself.
    #[must_use]
    pub fn from_image(address: PciAddress, image: ConfigImage) -> Self {
        let vendor_id = image.read_u16(header::VENDOR_ID);
        let device_id = image.read_u16(header::DEVICE_ID);
        let config_len = u32::try_from(image.len()).unwrap_or(u32::MAX);
        let caps = walk_capabilities(&image, config_len);

        Self {
            info: PciDeviceInfo::new(address, vendor_id, device_id),
            image,
            caps,
            access: AccessMethod::Dump,
            sysfs_path: None,
            power_budget: None,
            writes: Vec::new(),
        }
    }

    /// Appends a capability list entry.
    #[must_use]
    pub fn with_capability(mut self, id: u16, kind: CapabilityType, offset: u32) -> Self {
        self.caps.push(Capability::new(id, kind, offset));
        self
    }

    /// Sets BAR slot `index` (0-5).
    ///
    /// # Panics
    ///
    /// Panics if `index` is 6 or more.
    #[must_use]
    pub fn with_bar(mut self, index: usize, bar: PciBar) -> Self {
        self.info.bars[index] = bar;
        self
    }

    /// Sets the access method and, optionally, the sysfs PCI root.
    #[must_use]
    pub fn with_access(mut self, method: AccessMethod, sysfs_path: Option<PathBuf>) -> Self {
        self.access = method;
        self.sysfs_path = sysfs_path;
        self
    }

    /// Stores a 16-bit register value.
    #[must_use]
    pub fn with_u16(mut self, offset: u32, value: u16) -> Self {
        self.image.set_u16(offset, value);
        self
    }

    /// Stores a 32-bit register value.
    #[must_use]
    pub fn with_u32(mut self, offset: u32, value: u32) -> Self {
        self.image.set_u32(offset, value);
        self
    }

    /// Serves `entries` through the power budgeting capability at
    /// `cap_offset`.
    ///
    /// Writing index `i` to the Data Select register loads `entries[i]` (or 0
    /// past the end) into the Data register, as the hardware does.
    #[must_use]
    pub fn with_power_budget(mut self, cap_offset: u32, entries: Vec<u32>) -> Self {
        let budget = PowerBudget {
            cap_offset,
            entries,
        };
        self.image.set_u32(cap_offset + pwr::DATA, budget.data(0));
        self.power_budget = Some(budget);
        self
    }

    /// Returns every `(offset, value)` written through [`ConfigSpace::write_u8`].
    #[must_use]
    pub fn writes(&self) -> &[(u32, u8)] {
        &self.writes
    }
}

impl ConfigSpace for MemDevice {
    fn read_u8(&self, offset: u32) -> u8 {
        self.image.read_u8(offset)
    }

    fn write_u8(&mut self, offset: u32, value: u8) {
        self.writes.push((offset, value));
        self.image.set_u8(offset, value);

        if let Some(budget) = &self.power_budget {
            if offset == budget.cap_offset + pwr::DSR {
                let data = budget.data(value);
                self.image.set_u32(budget.cap_offset + pwr::DATA, data);
            }
        }
    }
}

impl PciDevice for MemDevice {
    fn info(&self) -> &PciDeviceInfo {
        &self.info
    }

    fn capabilities(&self) -> &[Capability] {
        &self.caps
    }

    fn access_method(&self) -> AccessMethod {
        self.access
    }

    fn sysfs_path(&self) -> Option<&Path> {
        self.sysfs_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::cap_id;

    #[test]
    fn image_reads_little_endian() {
        let mut img = ConfigImage::conventional();
        img.set_u32(0x10, 0x1122_3344);
        assert_eq!(img.read_u8(0x10), 0x44);
        assert_eq!(img.read_u16(0x10), 0x3344);
        assert_eq!(img.read_u16(0x12), 0x1122);
        assert_eq!(img.read_u32(0x10), 0x1122_3344);
    }

    #[test]
    fn image_out_of_range_reads_all_ones() {
        let img = ConfigImage::conventional();
        assert_eq!(img.read_u8(0x100), 0xFF);
        assert_eq!(img.read_u32(0xFFE), 0xFFFF_FFFF);
    }

    #[test]
    fn from_image_reads_identity_and_caps() {
        let mut img = ConfigImage::conventional();
        img.set_u16(header::VENDOR_ID, 0x1002);
        img.set_u16(header::DEVICE_ID, 0x66af);
        img.set_u16(header::STATUS, header::STATUS_CAPABILITIES_LIST);
        img.set_u8(header::CAPABILITIES_PTR, 0x64);
        img.set_u8(0x64, cap_id::EXP as u8);

        let dev = MemDevice::from_image(PciAddress::new(0, 3, 0, 0), img);
        assert_eq!(dev.info().vendor_id, 0x1002);
        assert_eq!(dev.info().device_id, 0x66af);
        assert_eq!(
            dev.capabilities(),
            [Capability::new(cap_id::EXP, CapabilityType::Normal, 0x64)]
        );
    }

    #[test]
    fn power_budget_select_loads_data() {
        let mut dev = MemDevice::new(PciAddress::default(), 0, 0)
            .with_power_budget(0x200, vec![0x0000_8119, 0x0000_0005]);

        assert_eq!(dev.read_u32(0x200 + pwr::DATA), 0x0000_8119);
        dev.write_u8(0x200 + pwr::DSR, 1);
        assert_eq!(dev.read_u32(0x200 + pwr::DATA), 0x0000_0005);
        dev.write_u8(0x200 + pwr::DSR, 2);
        assert_eq!(dev.read_u32(0x200 + pwr::DATA), 0);
        assert_eq!(dev.writes(), [(0x204, 1), (0x204, 2)]);
    }
}
