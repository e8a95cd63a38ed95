//! `rcqt-pci` --- PCI/PCIe capability decoding for pre-flight device checks.
//!
//! Decoders take any [`PciDevice`]: a handle that exposes configuration-space
//! reads (and the one write the power budgeting protocol needs), device
//! identity, BARs and an already-walked capability list. Two backends are
//! provided: [`SysfsDevice`] for live hardware under `/sys/bus/pci` and
//! [`MemDevice`] for captured configuration-space images.
//!
//! # Usage
//!
//! ```ignore
//! let mut dev = SysfsDevice::open(DEFAULT_SYSFS_PATH, "0000:43:00.0".parse()?)?;
//! for prop in PciProperty::ALL {
//!     println!("{prop} {}", prop.query(&mut dev));
//! }
//! ```

pub mod caps;
pub mod decode;
pub mod device;
pub mod mem;
pub mod property;
pub mod regs;
pub mod sysfs;

pub use caps::find_cap_offset;
pub use device::{
    AccessMethod, AddressParseError, Capability, CapabilityType, ConfigSpace, PciAddress, PciBar,
    PciDevice, PciDeviceInfo,
};
pub use mem::{ConfigImage, MemDevice};
pub use property::{PCI_CAP_DATA_MAX_BUF_SIZE, PciProperty, UnknownProperty};
pub use sysfs::{DEFAULT_SYSFS_PATH, SysfsDevice, SysfsError};
