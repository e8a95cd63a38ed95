//! Property decoders.
//!
//! Each decoder resolves the capability it needs, reads the relevant
//! registers and renders one human-readable string. When the capability is
//! absent the decoder returns its documented default instead of touching any
//! capability register.

mod atomic;
mod driver;
mod ident;
mod link;
mod power;
mod serial;
mod slot;

pub use atomic::{AtomicOpSupport, atomic_op_completer};
pub use driver::kernel_driver;
pub use ident::{device_id, vendor_id};
pub use link::{
    cur_speed_label, link_cap_max_speed, link_cap_max_width, link_stat_cur_speed,
    link_stat_neg_width, max_speed_label,
};
pub use power::{pwr_base_pwr, pwr_rail_type, rail_type_label};
pub use serial::{dev_serial_num, format_serial};
pub use slot::{slot_physical_num, slot_power_watts, slot_pwr_limit_value};

use crate::caps::find_cap_offset;
use crate::device::{CapabilityType, PciDevice};
use crate::regs::cap_id;

/// Offset of the PCI Express capability, if the device has one.
fn express_offset<D: PciDevice + ?Sized>(dev: &D) -> Option<u32> {
    find_cap_offset(dev, cap_id::EXP, CapabilityType::Normal)
}

/// `value × 10^(-scale)` watts.
fn scaled_watts(value: u32, scale: u32) -> f64 {
    f64::from(value) / f64::from(10u32.pow(scale))
}

/// Formats watts with three decimals and a `W` suffix.
fn format_watts(watts: f64) -> String {
    format!("{watts:.3}W")
}
