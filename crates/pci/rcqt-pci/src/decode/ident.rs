//! Vendor and device IDs.

use crate::device::PciDevice;

/// Device ID as an unsigned decimal string.
pub fn device_id<D: PciDevice + ?Sized>(dev: &D) -> String {
    dev.info().device_id.to_string()
}

/// Vendor ID as an unsigned decimal string.
pub fn vendor_id<D: PciDevice + ?Sized>(dev: &D) -> String {
    dev.info().vendor_id.to_string()
}
