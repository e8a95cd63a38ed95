//! Link speed and width from Link Capabilities / Link Status.

use super::express_offset;
use crate::device::PciDevice;
use crate::regs::exp;

/// Label for a Link Capabilities Max Link Speed code.
///
/// Matches on the raw encodings; any code outside 1-4 is unknown.
#[must_use]
pub fn max_speed_label(code: u32) -> &'static str {
    match code {
        1 => "2.5 GT/s",
        2 => "5 GT/s",
        3 => "8 GT/s",
        4 => "16 GT/s",
        _ => "Unknown speed",
    }
}

/// Label for a Link Status Current Link Speed code.
#[must_use]
pub fn cur_speed_label(code: u16) -> &'static str {
    match code {
        exp::LNKSTA_CLS_2_5GB => "2.5 GT/s",
        exp::LNKSTA_CLS_5_0GB => "5 GT/s",
        exp::LNKSTA_CLS_8_0GB => "8 GT/s",
        exp::LNKSTA_CLS_16_0GB => "16 GT/s",
        _ => "Unknown speed",
    }
}

/// Maximum link speed, or `""` without a PCI Express capability.
pub fn link_cap_max_speed<D: PciDevice + ?Sized>(dev: &D) -> String {
    express_offset(dev)
        .map(|cap| {
            let lnkcap = dev.read_u32(cap + exp::LNKCAP);
            max_speed_label(lnkcap & exp::LNKCAP_SLS)
        })
        .unwrap_or_default()
        .to_owned()
}

/// Maximum link width as `x<N>`, or `"x0"` without a PCI Express capability.
pub fn link_cap_max_width<D: PciDevice + ?Sized>(dev: &D) -> String {
    let width = express_offset(dev).map_or(0, |cap| {
        let lnkcap = dev.read_u32(cap + exp::LNKCAP);
        (lnkcap & exp::LNKCAP_MLW) >> exp::LNKCAP_MLW_SHIFT
    });
    format!("x{width}")
}

/// Current link speed, or `""` without a PCI Express capability.
pub fn link_stat_cur_speed<D: PciDevice + ?Sized>(dev: &D) -> String {
    express_offset(dev)
        .map(|cap| {
            let lnksta = dev.read_u16(cap + exp::LNKSTA);
            cur_speed_label(lnksta & exp::LNKSTA_CLS)
        })
        .unwrap_or_default()
        .to_owned()
}

/// Negotiated link width as `x<N>`, or `"x0"` without a PCI Express
/// capability.
pub fn link_stat_neg_width<D: PciDevice + ?Sized>(dev: &D) -> String {
    let width = express_offset(dev).map_or(0, |cap| {
        let lnksta = dev.read_u16(cap + exp::LNKSTA);
        (lnksta & exp::LNKSTA_NLW) >> exp::LNKSTA_NLW_SHIFT
    });
    format!("x{width}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{CapabilityType, PciAddress};
    use crate::mem::MemDevice;
    use crate::regs::cap_id;

    const CAP: u32 = 0x70;

    fn express_device() -> MemDevice {
        MemDevice::new(PciAddress::new(0, 3, 0, 0), 0x1002, 0x66af).with_capability(
            cap_id::EXP,
            CapabilityType::Normal,
            CAP,
        )
    }

    #[test]
    fn max_speed_codes() {
        assert_eq!(max_speed_label(1), "2.5 GT/s");
        assert_eq!(max_speed_label(2), "5 GT/s");
        assert_eq!(max_speed_label(3), "8 GT/s");
        assert_eq!(max_speed_label(4), "16 GT/s");
        for code in [0, 5, 6, 0xF] {
            assert_eq!(max_speed_label(code), "Unknown speed");
        }
    }

    #[test]
    fn cur_speed_codes() {
        assert_eq!(cur_speed_label(1), "2.5 GT/s");
        assert_eq!(cur_speed_label(4), "16 GT/s");
        assert_eq!(cur_speed_label(0), "Unknown speed");
        assert_eq!(cur_speed_label(7), "Unknown speed");
    }

    #[test]
    fn link_capabilities_decode() {
        // Gen3 x16, plus unrelated high bits (ASPM, port number).
        let dev = express_device().with_u32(CAP + exp::LNKCAP, 0x0700_4003 | (16 << 4));
        assert_eq!(link_cap_max_speed(&dev), "8 GT/s");
        assert_eq!(link_cap_max_width(&dev), "x16");
    }

    #[test]
    fn link_status_decode() {
        // Gen4 x8 with Link Training clear.
        let dev = express_device().with_u16(CAP + exp::LNKSTA, 0x1000 | (8 << 4) | 4);
        assert_eq!(link_stat_cur_speed(&dev), "16 GT/s");
        assert_eq!(link_stat_neg_width(&dev), "x8");
    }

    #[test]
    fn unknown_speed_code() {
        let dev = express_device()
            .with_u32(CAP + exp::LNKCAP, 0x0000_0015)
            .with_u16(CAP + exp::LNKSTA, 0x0010);
        assert_eq!(link_cap_max_speed(&dev), "Unknown speed");
        assert_eq!(link_stat_cur_speed(&dev), "Unknown speed");
        assert_eq!(link_cap_max_width(&dev), "x1");
        assert_eq!(link_stat_neg_width(&dev), "x1");
    }

    #[test]
    fn absent_express_capability() {
        let dev = MemDevice::new(PciAddress::default(), 0x8086, 0x1234)
            .with_u32(CAP + exp::LNKCAP, 0x0000_0043);
        assert_eq!(link_cap_max_speed(&dev), "");
        assert_eq!(link_cap_max_width(&dev), "x0");
        assert_eq!(link_stat_cur_speed(&dev), "");
        assert_eq!(link_stat_neg_width(&dev), "x0");
    }
}
