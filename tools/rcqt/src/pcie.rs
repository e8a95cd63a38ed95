//! PCIe property queries against sysfs devices.

use anyhow::{Context, Result};
use rcqt_core::{LogLevel, LogSink};
use rcqt_pci::{PciDevice, PciProperty, SysfsDevice, sysfs};

use crate::config::PcieConfig;

/// Queries every configured property on every configured device.
///
/// With no explicit device list, all devices under the sysfs root are
/// queried and ones that cannot be opened are skipped. An explicitly listed
/// device that cannot be opened is an error.
pub fn run(config: &PcieConfig, sink: &dyn LogSink) -> Result<()> {
    let explicit = !config.devices.is_empty();
    let devices = if explicit {
        config.devices.clone()
    } else {
        sysfs::enumerate(&config.sysfs_path).with_context(|| {
            format!("Failed to list devices under {}", config.sysfs_path.display())
        })?
    };

    tracing::info!(
        devices = devices.len(),
        properties = config.properties.len(),
        "querying PCIe properties"
    );

    for address in devices {
        let mut dev = match SysfsDevice::open(&config.sysfs_path, address) {
            Ok(dev) => dev,
            Err(err) if !explicit => {
                tracing::warn!(%address, %err, "skipping device");
                continue;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to open {address}"));
            }
        };
        query_device(&mut dev, &config.properties, sink);
    }

    Ok(())
}

/// Reports `[rcqt] pcie <address> <property> <value>` for each property.
pub fn query_device<D: PciDevice + ?Sized>(
    dev: &mut D,
    properties: &[PciProperty],
    sink: &dyn LogSink,
) {
    let address = dev.info().address;
    for &prop in properties {
        let value = prop.query(dev);
        sink.log(LogLevel::Results, &format!("[rcqt] pcie {address} {prop} {value}"));
    }
}
