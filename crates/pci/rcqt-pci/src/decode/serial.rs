//! Device Serial Number extended capability.

use crate::caps::find_cap_offset;
use crate::device::{CapabilityType, PciDevice};
use crate::regs::{dsn, ext_cap_id};

/// Formats a serial number as eight hyphen-separated hex bytes.
///
/// The upper dword comes first, each dword most significant byte first.
#[must_use]
pub fn format_serial(lower: u32, upper: u32) -> String {
    let [u3, u2, u1, u0] = upper.to_be_bytes();
    let [l3, l2, l1, l0] = lower.to_be_bytes();
    format!("{u3:02x}-{u2:02x}-{u1:02x}-{u0:02x}-{l3:02x}-{l2:02x}-{l1:02x}-{l0:02x}")
}

/// Device serial number, or `""` without a Device Serial Number capability.
pub fn dev_serial_num<D: PciDevice + ?Sized>(dev: &D) -> String {
    let Some(cap) = find_cap_offset(dev, ext_cap_id::DSN, CapabilityType::Extended) else {
        return String::new();
    };

    let lower = dev.read_u32(cap + dsn::LOWER);
    let upper = dev.read_u32(cap + dsn::UPPER);
    format_serial(lower, upper)
}
