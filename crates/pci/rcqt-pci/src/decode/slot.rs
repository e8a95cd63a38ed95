//! Slot power limit and physical slot number from Slot Capabilities.

use super::{express_offset, format_watts, scaled_watts};
use crate::device::PciDevice;
use crate::regs::exp;

/// Sentinel for an absent capability or a reserved power encoding.
const NO_POWER: f64 = -1.0;

/// Decodes the slot power limit, in watts, from a Slot Capabilities value.
///
/// Values above `0xEF` are the fixed high-range encodings (250, 270 and
/// 300 W); `0xF3`-`0xFF` are reserved and decode to `-1.0`.
#[must_use]
pub fn slot_power_watts(sltcap: u32) -> f64 {
    let scale = (sltcap & exp::SLTCAP_SPLS) >> exp::SLTCAP_SPLS_SHIFT;
    let value = (sltcap & exp::SLTCAP_SPLV) >> exp::SLTCAP_SPLV_SHIFT;

    if value > 0xEF {
        match value {
            0xF0 => 250.0,
            0xF1 => 270.0,
            0xF2 => 300.0,
            _ => NO_POWER,
        }
    } else {
        scaled_watts(value, scale)
    }
}

/// Slot power limit as `<watts>W` with three decimals, `"-1.000W"` without
/// a PCI Express capability.
pub fn slot_pwr_limit_value<D: PciDevice + ?Sized>(dev: &D) -> String {
    let watts = express_offset(dev).map_or(NO_POWER, |cap| {
        slot_power_watts(dev.read_u32(cap + exp::SLTCAP))
    });
    format_watts(watts)
}

/// Physical slot number as `#<N>`, `"#0"` without a PCI Express capability.
pub fn slot_physical_num<D: PciDevice + ?Sized>(dev: &D) -> String {
    let slot = express_offset(dev).map_or(0, |cap| {
        let sltcap = dev.read_u32(cap + exp::SLTCAP);
        (sltcap & exp::SLTCAP_PSN) >> exp::SLTCAP_PSN_SHIFT
    });
    format!("#{slot}")
}
