//! Power Budgeting extended capability.
//!
//! Entries are read through an indexed pair: write the index to Data Select,
//! then read Data. A zero Data value means there is no entry at that index.

use super::{format_watts, scaled_watts};
use crate::caps::find_cap_offset;
use crate::device::{CapabilityType, PciDevice};
use crate::regs::{ext_cap_id, pwr};

/// Label for a power budgeting Type code.
#[must_use]
pub fn rail_type_label(code: u32) -> &'static str {
    match code {
        0 => "PME_Aux",
        1 => "Auxiliary",
        2 => "Idle",
        3 => "Sustained",
        7 => "Maximum",
        _ => "Reserved",
    }
}

/// Selects entry 0 and returns its 16-bit data word, if any.
///
/// Only the first entry is consulted; later indices are never selected.
fn first_entry<D: PciDevice + ?Sized>(dev: &mut D) -> Option<u32> {
    let cap = find_cap_offset(dev, ext_cap_id::PWR, CapabilityType::Extended)?;

    dev.write_u8(cap + pwr::DSR, 0);
    let data = dev.read_u16(cap + pwr::DATA);
    if data == 0 {
        tracing::debug!(address = %dev.info().address, "power budget table is empty");
        return None;
    }

    Some(u32::from(data))
}

/// Base power of the first budget entry as `<watts>W`, or `""`.
pub fn pwr_base_pwr<D: PciDevice + ?Sized>(dev: &mut D) -> String {
    first_entry(dev)
        .map(|data| format_watts(scaled_watts(pwr::data_base(data), pwr::data_scale(data))))
        .unwrap_or_default()
}

/// Rail type of the first budget entry, or `""`.
pub fn pwr_rail_type<D: PciDevice + ?Sized>(dev: &mut D) -> String {
    first_entry(dev)
        .map(|data| rail_type_label(pwr::data_type(data)).to_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{ConfigSpace, PciAddress};
    use crate::mem::MemDevice;

    const CAP: u32 = 0x160;

    fn budget_device(entries: Vec<u32>) -> MemDevice {
        MemDevice::new(PciAddress::default(), 0x1002, 0x66af)
            .with_capability(ext_cap_id::PWR, CapabilityType::Extended, CAP)
            .with_power_budget(CAP, entries)
    }

    #[test]
    fn rail_type_codes() {
        assert_eq!(rail_type_label(0), "PME_Aux");
        assert_eq!(rail_type_label(1), "Auxiliary");
        assert_eq!(rail_type_label(2), "Idle");
        assert_eq!(rail_type_label(3), "Sustained");
        assert_eq!(rail_type_label(7), "Maximum");
        for code in 4..=6 {
            assert_eq!(rail_type_label(code), "Reserved");
        }
    }

    #[test]
    fn base_power_from_first_entry() {
        // Base 25, scale 1 (x0.1), Type bit set.
        let mut dev = budget_device(vec![0x0000_8119, 0x0000_004B]);
        assert_eq!(pwr_base_pwr(&mut dev), "2.500W");
        assert_eq!(dev.writes(), [(CAP + pwr::DSR, 0)]);
    }

    #[test]
    fn rail_type_from_first_entry() {
        let mut dev = budget_device(vec![0x0000_8119]);
        assert_eq!(pwr_rail_type(&mut dev), "Auxiliary");

        let mut dev = budget_device(vec![0x0000_004B]);
        assert_eq!(pwr_rail_type(&mut dev), "PME_Aux");
    }

    #[test]
    fn only_index_zero_is_selected() {
        // Selecting index 1 first must not leak into the decode.
        let mut dev = budget_device(vec![0x0000_0019, 0x0000_00FF]);
        dev.write_u8(CAP + pwr::DSR, 1);
        assert_eq!(pwr_base_pwr(&mut dev), "25.000W");
        assert_eq!(dev.writes().last(), Some(&(CAP + pwr::DSR, 0)));
    }

    #[test]
    fn empty_table_is_empty_string() {
        let mut dev = budget_device(Vec::new());
        assert_eq!(pwr_base_pwr(&mut dev), "");
        assert_eq!(pwr_rail_type(&mut dev), "");
        assert_eq!(dev.writes().len(), 2);
    }

    #[test]
    fn absent_capability_does_not_write() {
        let mut dev = MemDevice::new(PciAddress::default(), 0, 0);
        assert_eq!(pwr_base_pwr(&mut dev), "");
        assert_eq!(pwr_rail_type(&mut dev), "");
        assert!(dev.writes().is_empty());
    }
}
