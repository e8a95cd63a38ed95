//! Configuration-space register layouts.
//!
//! Offsets, masks and shifts are taken from the PCI Local Bus and PCI Express
//! Base specifications (the same values Linux exposes in `pci_regs.h`).
//! Capability-relative offsets are added to the offset returned by the
//! capability resolver.

/// Type 0 configuration header.
pub mod header {
    /// Vendor ID (16-bit, offset 0x00).
    pub const VENDOR_ID: u32 = 0x00;
    /// Device ID (16-bit, offset 0x02).
    pub const DEVICE_ID: u32 = 0x02;
    /// Status register (16-bit, offset 0x06).
    pub const STATUS: u32 = 0x06;
    /// Capabilities Pointer (8-bit, offset 0x34): first capability.
    pub const CAPABILITIES_PTR: u32 = 0x34;

    /// Bit 4 of the Status register: capabilities list present.
    pub const STATUS_CAPABILITIES_LIST: u16 = 1 << 4;

    /// Size of the conventional configuration space.
    pub const CONFIG_SPACE_SIZE: u32 = 0x100;
    /// Size of the PCI Express extended configuration space.
    pub const EXT_CONFIG_SPACE_SIZE: u32 = 0x1000;
    /// First extended capability header.
    pub const EXT_CAP_START: u32 = 0x100;
}

/// Capability IDs of the conventional (normal) list.
pub mod cap_id {
    /// Power Management.
    pub const PM: u16 = 0x01;
    /// MSI.
    pub const MSI: u16 = 0x05;
    /// Vendor-specific.
    pub const VENDOR: u16 = 0x09;
    /// PCI Express.
    pub const EXP: u16 = 0x10;
}

/// Capability IDs of the PCI Express extended list.
pub mod ext_cap_id {
    /// Advanced Error Reporting.
    pub const ERR: u16 = 0x01;
    /// Device Serial Number.
    pub const DSN: u16 = 0x03;
    /// Power Budgeting.
    pub const PWR: u16 = 0x04;
}

/// PCI Express capability structure.
pub mod exp {
    /// Capabilities register (16-bit).
    pub const FLAGS: u32 = 0x02;
    /// Capability structure version.
    pub const FLAGS_VERS: u16 = 0x000F;

    /// Link Capabilities register (32-bit).
    pub const LNKCAP: u32 = 0x0C;
    /// Max Link Speed.
    pub const LNKCAP_SLS: u32 = 0x0000_000F;
    /// Maximum Link Width.
    pub const LNKCAP_MLW: u32 = 0x0000_03F0;
    /// Maximum Link Width position.
    pub const LNKCAP_MLW_SHIFT: u32 = 4;

    /// Link Status register (16-bit).
    pub const LNKSTA: u32 = 0x12;
    /// Current Link Speed.
    pub const LNKSTA_CLS: u16 = 0x000F;
    /// Current Link Speed 2.5 GT/s.
    pub const LNKSTA_CLS_2_5GB: u16 = 0x0001;
    /// Current Link Speed 5.0 GT/s.
    pub const LNKSTA_CLS_5_0GB: u16 = 0x0002;
    /// Current Link Speed 8.0 GT/s.
    pub const LNKSTA_CLS_8_0GB: u16 = 0x0003;
    /// Current Link Speed 16.0 GT/s.
    pub const LNKSTA_CLS_16_0GB: u16 = 0x0004;
    /// Negotiated Link Width.
    pub const LNKSTA_NLW: u16 = 0x03F0;
    /// Negotiated Link Width position.
    pub const LNKSTA_NLW_SHIFT: u16 = 4;

    /// Slot Capabilities register (32-bit).
    pub const SLTCAP: u32 = 0x14;
    /// Slot Power Limit Value.
    pub const SLTCAP_SPLV: u32 = 0x0000_7F80;
    /// Slot Power Limit Value position.
    pub const SLTCAP_SPLV_SHIFT: u32 = 7;
    /// Slot Power Limit Scale.
    pub const SLTCAP_SPLS: u32 = 0x0001_8000;
    /// Slot Power Limit Scale position.
    pub const SLTCAP_SPLS_SHIFT: u32 = 15;
    /// Physical Slot Number.
    pub const SLTCAP_PSN: u32 = 0xFFF8_0000;
    /// Physical Slot Number position.
    pub const SLTCAP_PSN_SHIFT: u32 = 19;

    /// Device Capabilities 2 register (32-bit).
    pub const DEVCAP2: u32 = 0x24;
    /// 32-bit AtomicOp Completer Supported.
    pub const DEVCAP2_ATOMIC_COMP32: u32 = 0x0080;
    /// 64-bit AtomicOp Completer Supported.
    pub const DEVCAP2_ATOMIC_COMP64: u32 = 0x0100;
    /// 128-bit CAS Completer Supported.
    pub const DEVCAP2_ATOMIC_COMP128: u32 = 0x0200;

    /// Device Control 2 register (16-bit).
    pub const DEVCTL2: u32 = 0x28;
    /// AtomicOp Requester Enable.
    pub const DEVCTL2_ATOMIC_REQ: u16 = 0x0040;
}

/// Device Serial Number extended capability.
pub mod dsn {
    /// Serial number lower dword.
    pub const LOWER: u32 = 0x04;
    /// Serial number upper dword.
    pub const UPPER: u32 = 0x08;
}

/// Power Budgeting extended capability.
pub mod pwr {
    /// Data Select register (8-bit).
    pub const DSR: u32 = 0x04;
    /// Data register.
    pub const DATA: u32 = 0x08;

    /// Base Power field of the data register.
    #[must_use]
    pub const fn data_base(data: u32) -> u32 {
        data & 0xFF
    }

    /// Data Scale field of the data register.
    #[must_use]
    pub const fn data_scale(data: u32) -> u32 {
        (data >> 8) & 3
    }

    /// Type field of the data register.
    #[must_use]
    pub const fn data_type(data: u32) -> u32 {
        (data >> 15) & 7
    }
}
