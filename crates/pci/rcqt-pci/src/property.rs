//! The catalog of queryable device properties.
//!
//! A host asks for properties by name (`"link_cap_max_speed"`,
//! `"dev_serial_num"`, ...). [`PciProperty`] maps each name to its decoder and
//! clamps every result to the fixed output buffer size.

use core::fmt;
use core::str::FromStr;

use crate::decode;
use crate::device::PciDevice;

/// Size of a property output buffer, terminator included.
pub const PCI_CAP_DATA_MAX_BUF_SIZE: usize = 1024;

/// Clamps `value` to at most `PCI_CAP_DATA_MAX_BUF_SIZE - 1` bytes.
///
/// The cut lands on a character boundary, so the result may be a few bytes
/// shorter than the limit for multi-byte text.
#[must_use]
pub fn bounded(mut value: String) -> String {
    let max = PCI_CAP_DATA_MAX_BUF_SIZE - 1;
    if value.len() > max {
        let mut end = max;
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        value.truncate(end);
    }
    value
}

/// A named device property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PciProperty {
    /// Maximum link speed from Link Capabilities.
    LinkCapMaxSpeed,
    /// Maximum link width from Link Capabilities.
    LinkCapMaxWidth,
    /// Current link speed from Link Status.
    LinkStatCurSpeed,
    /// Negotiated link width from Link Status.
    LinkStatNegWidth,
    /// Slot power limit in watts.
    SlotPwrLimitValue,
    /// Physical slot number.
    SlotPhysicalNum,
    /// Device ID.
    DeviceId,
    /// Vendor ID.
    VendorId,
    /// Bound kernel driver.
    KernelDriver,
    /// Device Serial Number.
    DevSerialNum,
    /// Power budgeting base power.
    PwrBasePwr,
    /// Power budgeting rail type.
    PwrRailType,
    /// AtomicOp requester enable and completer support.
    AtomicOpCompleter,
}

impl PciProperty {
    /// Every property, in catalog order.
    pub const ALL: [Self; 13] = [
        Self::LinkCapMaxSpeed,
        Self::LinkCapMaxWidth,
        Self::LinkStatCurSpeed,
        Self::LinkStatNegWidth,
        Self::SlotPwrLimitValue,
        Self::SlotPhysicalNum,
        Self::DeviceId,
        Self::VendorId,
        Self::KernelDriver,
        Self::DevSerialNum,
        Self::PwrBasePwr,
        Self::PwrRailType,
        Self::AtomicOpCompleter,
    ];

    /// Returns the property key.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LinkCapMaxSpeed => "link_cap_max_speed",
            Self::LinkCapMaxWidth => "link_cap_max_width",
            Self::LinkStatCurSpeed => "link_stat_cur_speed",
            Self::LinkStatNegWidth => "link_stat_neg_width",
            Self::SlotPwrLimitValue => "slot_pwr_limit_value",
            Self::SlotPhysicalNum => "slot_physical_num",
            Self::DeviceId => "device_id",
            Self::VendorId => "vendor_id",
            Self::KernelDriver => "kernel_driver",
            Self::DevSerialNum => "dev_serial_num",
            Self::PwrBasePwr => "pwr_base_pwr",
            Self::PwrRailType => "pwr_rail_type",
            Self::AtomicOpCompleter => "atomic_op_completer",
        }
    }

    /// Looks up a property by key.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Returns `true` if querying this property writes device registers.
    #[must_use]
    pub const fn writes_device(self) -> bool {
        matches!(self, Self::PwrBasePwr | Self::PwrRailType)
    }

    /// Decodes this property from `dev`.
    pub fn query<D: PciDevice + ?Sized>(self, dev: &mut D) -> String {
        let value = match self {
            Self::LinkCapMaxSpeed => decode::link_cap_max_speed(dev),
            Self::LinkCapMaxWidth => decode::link_cap_max_width(dev),
            Self::LinkStatCurSpeed => decode::link_stat_cur_speed(dev),
            Self::LinkStatNegWidth => decode::link_stat_neg_width(dev),
            Self::SlotPwrLimitValue => decode::slot_pwr_limit_value(dev),
            Self::SlotPhysicalNum => decode::slot_physical_num(dev),
            Self::DeviceId => decode::device_id(dev),
            Self::VendorId => decode::vendor_id(dev),
            Self::KernelDriver => decode::kernel_driver(dev),
            Self::DevSerialNum => decode::dev_serial_num(dev),
            Self::PwrBasePwr => decode::pwr_base_pwr(dev),
            Self::PwrRailType => decode::pwr_rail_type(dev),
            Self::AtomicOpCompleter => decode::atomic_op_completer(dev),
        };
        bounded(value)
    }
}

impl fmt::Display for PciProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned for an unknown property key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown PCI property `{0}`")]
pub struct UnknownProperty(pub String);

impl FromStr for PciProperty {
    type Err = UnknownProperty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownProperty(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::PciAddress;
    use crate::mem::MemDevice;

    #[test]
    fn names_round_trip() {
        for prop in PciProperty::ALL {
            assert_eq!(PciProperty::from_name(prop.name()), Some(prop));
            assert_eq!(prop.to_string().parse::<PciProperty>(), Ok(prop));
        }
        assert_eq!(PciProperty::from_name("link_speed"), None);
        assert!("nope".parse::<PciProperty>().is_err());
    }

    #[test]
    fn only_power_budget_writes() {
        let writers: Vec<_> = PciProperty::ALL
            .into_iter()
            .filter(|p| p.writes_device())
            .collect();
        assert_eq!(writers, [PciProperty::PwrBasePwr, PciProperty::PwrRailType]);
    }

    #[test]
    fn bounded_leaves_short_values() {
        assert_eq!(bounded("x16".to_owned()), "x16");
    }

    #[test]
    fn bounded_truncates_to_buffer() {
        let long = "a".repeat(4000);
        assert_eq!(bounded(long).len(), PCI_CAP_DATA_MAX_BUF_SIZE - 1);
    }

    #[test]
    fn bounded_respects_char_boundaries() {
        // 1022 ASCII bytes followed by a 3-byte character straddling the cut.
        let value = format!("{}€tail", "a".repeat(1022));
        let out = bounded(value);
        assert_eq!(out.len(), 1022);
        assert!(out.chars().all(|c| c == 'a'));
    }

    #[test]
    fn query_absent_capability_defaults() {
        let mut dev = MemDevice::new(PciAddress::default(), 0x1002, 0x66af);
        let values: Vec<(&str, String)> = PciProperty::ALL
            .into_iter()
            .map(|p| (p.name(), p.query(&mut dev)))
            .collect();

        assert_eq!(
            values,
            [
                ("link_cap_max_speed", String::new()),
                ("link_cap_max_width", "x0".to_owned()),
                ("link_stat_cur_speed", String::new()),
                ("link_stat_neg_width", "x0".to_owned()),
                ("slot_pwr_limit_value", "-1.000W".to_owned()),
                ("slot_physical_num", "#0".to_owned()),
                ("device_id", "26287".to_owned()),
                ("vendor_id", "4098".to_owned()),
                ("kernel_driver", String::new()),
                ("dev_serial_num", String::new()),
                ("pwr_base_pwr", String::new()),
                ("pwr_rail_type", String::new()),
                ("atomic_op_completer", "FALSE FALSE FALSE FALSE".to_owned()),
            ]
        );
        assert!(dev.writes().is_empty());
    }
}
