//! Capability offset resolution and capability-list walking.
//!
//! [`find_cap_offset`] is what every decoder goes through: a linear scan of
//! the device's already-built capability list. [`walk_capabilities`] builds
//! such a list from raw configuration space for the device backends in this
//! crate.

use crate::device::{Capability, CapabilityType, ConfigSpace, PciDevice};
use crate::regs::header;

/// Upper bound on normal-list entries (192 bytes of dword-aligned headers).
const MAX_NORMAL_CAPS: usize = 48;
/// Normal capabilities live past the 64-byte standard header.
const HEADER_END: u8 = 0x40;
/// Upper bound on extended-list entries (3840 bytes of dword-aligned headers).
const MAX_EXTENDED_CAPS: usize = 960;

/// Returns the offset of the first capability matching `id` and `kind`.
///
/// `None` means the capability is absent. Offset 0 is never a valid
/// capability location, so a matching entry recorded at offset 0 is also
/// reported as absent.
#[must_use]
pub fn find_cap_offset<D: PciDevice + ?Sized>(
    dev: &D,
    id: u16,
    kind: CapabilityType,
) -> Option<u32> {
    dev.capabilities()
        .iter()
        .find(|cap| cap.id == id && cap.kind == kind)
        .map(|cap| cap.offset)
        .filter(|&offset| offset != 0)
}

/// Iterator over the conventional capability list.
pub struct CapabilityIter<'a, C: ConfigSpace + ?Sized> {
    space: &'a C,
    next_offset: u8,
    remaining: usize,
}

impl<C: ConfigSpace + ?Sized> Iterator for CapabilityIter<'_, C> {
    type Item = Capability;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.next_offset & 0xFC; // dword-aligned
        if offset < HEADER_END || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let cap_id = self.space.read_u8(u32::from(offset));
        // Unreadable configuration space.
        if cap_id == 0xFF {
            self.remaining = 0;
            return None;
        }
        self.next_offset = self.space.read_u8(u32::from(offset) + 1);

        Some(Capability::new(
            u16::from(cap_id),
            CapabilityType::Normal,
            u32::from(offset),
        ))
    }
}

/// Iterator over the PCI Express extended capability list.
pub struct ExtCapabilityIter<'a, C: ConfigSpace + ?Sized> {
    space: &'a C,
    next_offset: u32,
    remaining: usize,
}

impl<C: ConfigSpace + ?Sized> Iterator for ExtCapabilityIter<'_, C> {
    type Item = Capability;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.next_offset & 0xFFC;
        if offset < header::EXT_CAP_START || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let hdr = self.space.read_u32(offset);
        // Empty or unreadable extended space.
        if hdr == 0 || hdr == 0xFFFF_FFFF {
            self.remaining = 0;
            return None;
        }

        // ID = bits 15:0, version = bits 19:16, next = bits 31:20.
        self.next_offset = hdr >> 20;

        Some(Capability::new(
            (hdr & 0xFFFF) as u16,
            CapabilityType::Extended,
            offset,
        ))
    }
}

/// Returns an iterator over the conventional capability list.
///
/// Returns `None` if the device does not have a capabilities list (status
/// register bit 4 is clear).
pub fn normal_capabilities<C: ConfigSpace + ?Sized>(space: &C) -> Option<CapabilityIter<'_, C>> {
    let status = space.read_u16(header::STATUS);
    if status & header::STATUS_CAPABILITIES_LIST == 0 {
        return None;
    }

    Some(CapabilityIter {
        space,
        next_offset: space.read_u8(header::CAPABILITIES_PTR),
        remaining: MAX_NORMAL_CAPS,
    })
}

/// Returns an iterator over the extended capability list.
///
/// Only meaningful when the full 4 KiB configuration space is readable.
pub fn extended_capabilities<C: ConfigSpace + ?Sized>(space: &C) -> ExtCapabilityIter<'_, C> {
    ExtCapabilityIter {
        space,
        next_offset: header::EXT_CAP_START,
        remaining: MAX_EXTENDED_CAPS,
    }
}

/// Collects the full capability list: normal entries, then extended ones.
///
/// `config_len` is the number of readable configuration-space bytes; the
/// extended list is only walked when it covers more than the first 256.
#[must_use]
pub fn walk_capabilities<C: ConfigSpace + ?Sized>(space: &C, config_len: u32) -> Vec<Capability> {
    let mut caps: Vec<Capability> = normal_capabilities(space)
        .map(Iterator::collect)
        .unwrap_or_default();

    if config_len > header::CONFIG_SPACE_SIZE {
        caps.extend(extended_capabilities(space));
    }

    caps
}
