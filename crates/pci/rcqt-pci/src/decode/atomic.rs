//! AtomicOp requester enable and completer support.

use core::fmt;

use super::express_offset;
use crate::device::PciDevice;
use crate::regs::exp;

/// AtomicOp state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AtomicOpSupport {
    /// AtomicOp Requester Enable (Device Control 2).
    pub requester_enable: bool,
    /// 32-bit AtomicOp Completer Supported (Device Capabilities 2).
    pub completer_32bit: bool,
    /// 64-bit AtomicOp Completer Supported (Device Capabilities 2).
    pub completer_64bit: bool,
    /// 128-bit CAS Completer Supported (Device Capabilities 2).
    pub completer_128bit_cas: bool,
}

impl AtomicOpSupport {
    /// Reads AtomicOp state from `dev`.
    ///
    /// Everything stays `false` without a PCI Express capability or with a
    /// version 1 capability structure, which has no Device Capabilities 2 /
    /// Device Control 2 registers. Completer bits are only read when the
    /// device has a populated memory BAR; the requester enable bit is read
    /// regardless.
    pub fn read<D: PciDevice + ?Sized>(dev: &D) -> Self {
        let mut support = Self::default();

        let Some(cap) = express_offset(dev) else {
            return support;
        };

        let flags = dev.read_u16(cap + exp::FLAGS);
        if flags & exp::FLAGS_VERS < 2 {
            return support;
        }

        if dev.info().bars.iter().any(|bar| bar.is_populated_memory()) {
            let devcap2 = dev.read_u32(cap + exp::DEVCAP2);
            support.completer_32bit = devcap2 & exp::DEVCAP2_ATOMIC_COMP32 != 0;
            support.completer_64bit = devcap2 & exp::DEVCAP2_ATOMIC_COMP64 != 0;
            support.completer_128bit_cas = devcap2 & exp::DEVCAP2_ATOMIC_COMP128 != 0;
        }

        let devctl2 = dev.read_u16(cap + exp::DEVCTL2);
        support.requester_enable = devctl2 & exp::DEVCTL2_ATOMIC_REQ != 0;

        support
    }
}

fn flag(value: bool) -> &'static str {
    if value { "TRUE" } else { "FALSE" }
}

impl fmt::Display for AtomicOpSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            flag(self.requester_enable),
            flag(self.completer_32bit),
            flag(self.completer_64bit),
            flag(self.completer_128bit_cas)
        )
    }
}

/// `"<requester> <32-bit> <64-bit> <128-bit CAS>"` as `TRUE`/`FALSE` tokens.
pub fn atomic_op_completer<D: PciDevice + ?Sized>(dev: &D) -> String {
    AtomicOpSupport::read(dev).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{CapabilityType, PciAddress, PciBar};
    use crate::mem::MemDevice;
    use crate::regs::cap_id;

    const CAP: u32 = 0x64;

    const MEM_BAR: PciBar = PciBar::Memory {
        base: 0xf000_0000,
        size: 0x1000_0000,
        prefetchable: true,
        is_64bit: true,
    };

    fn device(version: u16, devcap2: u32, devctl2: u16) -> MemDevice {
        MemDevice::new(PciAddress::default(), 0x1002, 0x66af)
            .with_capability(cap_id::EXP, CapabilityType::Normal, CAP)
            .with_u16(CAP + exp::FLAGS, version)
            .with_u32(CAP + exp::DEVCAP2, devcap2)
            .with_u16(CAP + exp::DEVCTL2, devctl2)
    }

    #[test]
    fn all_supported() {
        let dev = device(2, 0x0380, 0x0040).with_bar(0, MEM_BAR);
        assert_eq!(atomic_op_completer(&dev), "TRUE TRUE TRUE TRUE");
    }

    #[test]
    fn individual_completer_bits() {
        let dev = device(2, 0x0100, 0).with_bar(2, MEM_BAR);
        assert_eq!(
            AtomicOpSupport::read(&dev),
            AtomicOpSupport {
                requester_enable: false,
                completer_32bit: false,
                completer_64bit: true,
                completer_128bit_cas: false,
            }
        );
        assert_eq!(atomic_op_completer(&dev), "FALSE FALSE TRUE FALSE");
    }

    #[test]
    fn version_one_reports_nothing() {
        let dev = device(1, 0xFFFF_FFFF, 0xFFFF).with_bar(0, MEM_BAR);
        assert_eq!(atomic_op_completer(&dev), "FALSE FALSE FALSE FALSE");
        let dev = device(0, 0xFFFF_FFFF, 0xFFFF).with_bar(0, MEM_BAR);
        assert_eq!(atomic_op_completer(&dev), "FALSE FALSE FALSE FALSE");
    }

    #[test]
    fn requester_read_without_memory_bar() {
        let dev = device(2, 0x0380, 0x0040).with_bar(0, PciBar::Io { base: 0xe000, size: 0x100 });
        assert_eq!(atomic_op_completer(&dev), "TRUE FALSE FALSE FALSE");
    }

    #[test]
    fn zero_sized_memory_bar_is_ignored() {
        let empty = PciBar::Memory {
            base: 0xf000_0000,
            size: 0,
            prefetchable: false,
            is_64bit: false,
        };
        let dev = device(2, 0x0380, 0).with_bar(0, empty);
        assert_eq!(atomic_op_completer(&dev), "FALSE FALSE FALSE FALSE");
    }

    #[test]
    fn version_field_is_low_nibble() {
        // Device/port type and slot bits above the version.
        let dev = device(2, 0x0080, 0)
            .with_u16(CAP + exp::FLAGS, 0x0142)
            .with_bar(5, MEM_BAR);
        assert_eq!(atomic_op_completer(&dev), "FALSE TRUE FALSE FALSE");
    }

    #[test]
    fn absent_express_capability() {
        let dev = MemDevice::new(PciAddress::default(), 0, 0)
            .with_u32(CAP + exp::DEVCAP2, 0xFFFF_FFFF)
            .with_bar(0, MEM_BAR);
        assert_eq!(atomic_op_completer(&dev), "FALSE FALSE FALSE FALSE");
    }
}
