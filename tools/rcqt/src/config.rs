//! Check file loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rcqt_core::PropertyMap;
use rcqt_pci::{PciAddress, PciProperty, sysfs::DEFAULT_SYSFS_PATH};
use serde::Deserialize;

/// Raw check file layout.
#[derive(Debug, Default, Deserialize)]
struct CheckFile {
    /// Passed to the kernel check as its property map.
    kernelcheck: Option<PropertyMap>,
    pcie: Option<PcieSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PcieSection {
    sysfs_path: Option<PathBuf>,
    #[serde(default)]
    devices: Vec<String>,
    #[serde(default)]
    properties: Vec<String>,
}

/// PCIe property queries to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcieConfig {
    /// sysfs PCI root.
    pub sysfs_path: PathBuf,
    /// Devices to query; empty means every device under `sysfs_path`.
    pub devices: Vec<PciAddress>,
    /// Properties to query, in order.
    pub properties: Vec<PciProperty>,
}

/// A loaded check file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// `[kernelcheck]` table, if present.
    pub kernelcheck: Option<PropertyMap>,
    /// `[pcie]` table, if present.
    pub pcie: Option<PcieConfig>,
}

impl Config {
    /// Load a check file from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse check file contents.
    pub fn parse(content: &str) -> Result<Self> {
        let file: CheckFile = toml::from_str(content)?;

        let pcie = file.pcie.map(PcieConfig::try_from).transpose()?;

        Ok(Self {
            kernelcheck: file.kernelcheck,
            pcie,
        })
    }
}

impl TryFrom<PcieSection> for PcieConfig {
    type Error = anyhow::Error;

    fn try_from(section: PcieSection) -> Result<Self> {
        let devices = section
            .devices
            .iter()
            .map(|d| {
                d.parse::<PciAddress>()
                    .with_context(|| format!("Invalid device in [pcie]: {d}"))
            })
            .collect::<Result<Vec<PciAddress>>>()?;

        let properties = if section.properties.is_empty() {
            PciProperty::ALL.to_vec()
        } else {
            section
                .properties
                .iter()
                .map(|p| {
                    p.parse::<PciProperty>()
                        .with_context(|| format!("Invalid property in [pcie]: {p}"))
                })
                .collect::<Result<Vec<PciProperty>>>()?
        };

        Ok(Self {
            sysfs_path: section
                .sysfs_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SYSFS_PATH)),
            devices,
            properties,
        })
    }
}
