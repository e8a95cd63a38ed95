//! Bound kernel driver, read from the sysfs `driver` symlink.

use std::fs;
use std::path::Path;

use crate::device::{AccessMethod, PciAddress, PciDevice};
use crate::property::PCI_CAP_DATA_MAX_BUF_SIZE;

/// Name of the driver bound to `dev`, or `""`.
///
/// Only devices reached through sysfs have a driver link. Any failure to
/// build or resolve the link (no driver bound, path or target longer than the
/// output buffer) yields `""`.
pub fn kernel_driver<D: PciDevice + ?Sized>(dev: &D) -> String {
    if dev.access_method() != AccessMethod::SysBusPci {
        return String::new();
    }

    let Some(base) = dev.sysfs_path().filter(|p| !p.as_os_str().is_empty()) else {
        return String::new();
    };

    driver_name(base, &dev.info().address).unwrap_or_default()
}

fn driver_name(base: &Path, address: &PciAddress) -> Option<String> {
    let link = base
        .join("devices")
        .join(address.to_string())
        .join("driver");
    if link.as_os_str().len() >= PCI_CAP_DATA_MAX_BUF_SIZE {
        tracing::debug!(path = %link.display(), "driver link path too long");
        return None;
    }

    let target = match fs::read_link(&link) {
        Ok(target) => target,
        Err(err) => {
            tracing::debug!(%address, path = %link.display(), %err, "no driver link");
            return None;
        }
    };
    if target.as_os_str().len() >= PCI_CAP_DATA_MAX_BUF_SIZE {
        tracing::debug!(%address, "driver link target too long");
        return None;
    }

    let target = target.to_string_lossy();
    let name = target.rsplit_once('/').map_or(&*target, |(_, name)| name);
    Some(name.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::MemDevice;
    use std::os::unix::fs::symlink;
    use std::path::PathBuf;

    const ADDR: PciAddress = PciAddress::new(0, 0x03, 0x00, 0);

    fn sysfs_with_driver(target: &str) -> tempfile::TempDir {
        let root = tempfile::tempdir().expect("tempdir");
        let dev_dir = root.path().join("devices").join("0000:03:00.0");
        fs::create_dir_all(&dev_dir).expect("create device dir");
        symlink(target, dev_dir.join("driver")).expect("symlink");
        root
    }

    fn sysfs_device(base: PathBuf) -> MemDevice {
        MemDevice::new(ADDR, 0x1002, 0x66af).with_access(AccessMethod::SysBusPci, Some(base))
    }

    #[test]
    fn resolves_last_path_component() {
        let root = sysfs_with_driver("../../../bus/pci/drivers/amdgpu");
        let dev = sysfs_device(root.path().to_path_buf());
        assert_eq!(kernel_driver(&dev), "amdgpu");
    }

    #[test]
    fn bare_target_is_returned_whole() {
        let root = sysfs_with_driver("vfio-pci");
        let dev = sysfs_device(root.path().to_path_buf());
        assert_eq!(kernel_driver(&dev), "vfio-pci");
    }

    #[test]
    fn unbound_device_is_empty() {
        let root = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(root.path().join("devices/0000:03:00.0")).expect("create device dir");
        let dev = sysfs_device(root.path().to_path_buf());
        assert_eq!(kernel_driver(&dev), "");
    }

    #[test]
    fn non_sysfs_access_is_empty() {
        let root = sysfs_with_driver("../drivers/amdgpu");
        let dev = MemDevice::new(ADDR, 0x1002, 0x66af)
            .with_access(AccessMethod::ProcBusPci, Some(root.path().to_path_buf()));
        assert_eq!(kernel_driver(&dev), "");
    }

    #[test]
    fn missing_or_empty_base_is_empty() {
        let dev = MemDevice::new(ADDR, 0, 0).with_access(AccessMethod::SysBusPci, None);
        assert_eq!(kernel_driver(&dev), "");
        let dev = sysfs_device(PathBuf::new());
        assert_eq!(kernel_driver(&dev), "");
    }

    #[test]
    fn overlong_path_is_empty() {
        let dev = sysfs_device(PathBuf::from("/").join("x".repeat(PCI_CAP_DATA_MAX_BUF_SIZE)));
        assert_eq!(kernel_driver(&dev), "");
    }

    #[test]
    fn overlong_target_is_empty() {
        let long_target = format!("../{}", "d".repeat(PCI_CAP_DATA_MAX_BUF_SIZE));
        let root = sysfs_with_driver(&long_target);
        let dev = sysfs_device(root.path().to_path_buf());
        assert_eq!(kernel_driver(&dev), "");
    }
}
