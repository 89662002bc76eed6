// Block device tree: `lsblk -J` parsing and mounted-filesystem usage.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Collected, CollectorError};
use crate::models::{DiskDevice, DiskPartition, DiskUsage};

pub(super) const LSBLK_ARGS: &[&str] = &["-J", "-o", "NAME,SIZE,TYPE,MOUNTPOINT"];

#[derive(Debug, Deserialize)]
struct LsblkOutput {
    #[serde(default)]
    blockdevices: Vec<LsblkDevice>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LsblkDevice {
    name: String,
    #[serde(default)]
    size: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    mountpoint: Option<String>,
    /// util-linux >= 2.37 may emit the list form instead.
    #[serde(default)]
    mountpoints: Vec<Option<String>>,
    #[serde(default)]
    children: Vec<LsblkDevice>,
}

impl LsblkDevice {
    fn mountpoint(&self) -> Option<String> {
        self.mountpoint
            .clone()
            .or_else(|| self.mountpoints.iter().flatten().next().cloned())
            .filter(|m| !m.is_empty())
    }
}

/// A mounted filesystem as seen by the sampler.
#[derive(Debug, Clone)]
pub(super) struct MountedFs {
    pub(super) name: String,
    pub(super) mountpoint: String,
    pub(super) file_system: String,
    pub(super) total: u64,
    pub(super) available: u64,
}

pub(super) fn parse_lsblk(json: &str) -> Collected<Vec<LsblkDevice>> {
    let out: LsblkOutput = serde_json::from_str(json).map_err(|e| CollectorError::Parse {
        what: "lsblk",
        reason: e.to_string(),
    })?;
    Ok(out.blockdevices)
}

/// Attach usage to every mounted device or partition. Nested children
/// (LVM, dm-crypt) are flattened into the owning device's partition list.
pub(super) fn build_devices(devices: Vec<LsblkDevice>, mounts: &[MountedFs]) -> Vec<DiskDevice> {
    let usage_by_mount: HashMap<&str, DiskUsage> = mounts
        .iter()
        .map(|m| (m.mountpoint.as_str(), DiskUsage::from_bytes(m.total, m.available)))
        .collect();
    let usage_for =
        |mountpoint: Option<&str>| -> Option<DiskUsage> { usage_by_mount.get(mountpoint?).cloned() };

    devices
        .into_iter()
        .map(|dev| {
            let mountpoint = dev.mountpoint();
            let mut partitions = Vec::new();
            flatten_children(dev.children, &mut partitions, &usage_for);
            DiskDevice {
                usage: usage_for(mountpoint.as_deref()),
                name: dev.name,
                size: dev.size.unwrap_or_else(|| "unknown".into()),
                kind: dev.kind.unwrap_or_else(|| "unknown".into()),
                mountpoint,
                partitions,
            }
        })
        .collect()
}

fn flatten_children(
    children: Vec<LsblkDevice>,
    out: &mut Vec<DiskPartition>,
    usage_for: &dyn Fn(Option<&str>) -> Option<DiskUsage>,
) {
    for child in children {
        let mountpoint = child.mountpoint();
        out.push(DiskPartition {
            usage: usage_for(mountpoint.as_deref()),
            name: child.name,
            size: child.size.unwrap_or_else(|| "unknown".into()),
            kind: child.kind.unwrap_or_else(|| "unknown".into()),
            mountpoint,
        });
        flatten_children(child.children, out, usage_for);
    }
}

/// One device per mounted filesystem; used when lsblk isn't available.
pub(super) fn devices_from_mounts(mounts: &[MountedFs]) -> Vec<DiskDevice> {
    mounts
        .iter()
        .map(|m| {
            let size = format_size(m.total);
            let name = m.name.trim_start_matches("/dev/").to_string();
            DiskDevice {
                name: name.clone(),
                size: size.clone(),
                kind: "disk".into(),
                mountpoint: None,
                usage: None,
                partitions: vec![DiskPartition {
                    name,
                    size,
                    kind: m.file_system.clone(),
                    mountpoint: Some(m.mountpoint.clone()),
                    usage: Some(DiskUsage::from_bytes(m.total, m.available)),
                }],
            }
        })
        .collect()
}

/// lsblk-style binary size, e.g. `29.7G`.
pub(super) fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "K", "M", "G", "T", "P"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{}{}", bytes, UNITS[0])
    } else if value.fract() == 0.0 {
        format!("{}{}", value as u64, UNITS[unit])
    } else {
        format!("{:.1}{}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIB: u64 = 1024 * 1024 * 1024;

    const LSBLK_PI: &str = r#"{
       "blockdevices": [
          {"name": "mmcblk0", "size": "29.7G", "type": "disk", "mountpoint": null,
             "children": [
                {"name": "mmcblk0p1", "size": "512M", "type": "part", "mountpoint": "/boot/firmware"},
                {"name": "mmcblk0p2", "size": "29.2G", "type": "part", "mountpoint": "/"}
             ]
          },
          {"name": "sda", "size": "931.5G", "type": "disk", "mountpoint": null,
             "children": [
                {"name": "sda1", "size": "931.5G", "type": "part", "mountpoint": null}
             ]
          },
          {"name": "sr0", "size": "1024M", "type": "rom", "mountpoint": null}
       ]
    }"#;

    fn mounts() -> Vec<MountedFs> {
        vec![
            MountedFs {
                name: "/dev/mmcblk0p2".into(),
                mountpoint: "/".into(),
                file_system: "ext4".into(),
                total: 29 * GIB,
                available: 20 * GIB,
            },
            MountedFs {
                name: "/dev/mmcblk0p1".into(),
                mountpoint: "/boot/firmware".into(),
                file_system: "vfat".into(),
                total: GIB / 2,
                available: GIB / 4,
            },
        ]
    }

    #[test]
    fn builds_tree_with_usage_for_mounted_partitions() {
        let devices = build_devices(parse_lsblk(LSBLK_PI).unwrap(), &mounts());
        assert_eq!(devices.len(), 3);

        let sd = &devices[0];
        assert_eq!(sd.name, "mmcblk0");
        assert_eq!(sd.size, "29.7G");
        assert!(sd.usage.is_none());
        assert_eq!(sd.partitions.len(), 2);
        let root = &sd.partitions[1];
        assert_eq!(root.mountpoint.as_deref(), Some("/"));
        let usage = root.usage.as_ref().unwrap();
        assert_eq!(usage.total, 29.0);
        assert_eq!(usage.free, 20.0);
        assert_eq!(usage.used, 9.0);
        assert_eq!(usage.percent, 31.0);
    }

    #[test]
    fn unmounted_partition_has_no_usage() {
        let devices = build_devices(parse_lsblk(LSBLK_PI).unwrap(), &mounts());
        let usb = &devices[1];
        assert_eq!(usb.partitions.len(), 1);
        assert!(usb.partitions[0].mountpoint.is_none());
        assert!(usb.partitions[0].usage.is_none());
    }

    #[test]
    fn device_without_partitions_keeps_empty_list() {
        let devices = build_devices(parse_lsblk(LSBLK_PI).unwrap(), &mounts());
        let rom = &devices[2];
        assert_eq!(rom.kind, "rom");
        assert!(rom.partitions.is_empty());
    }

    #[test]
    fn nested_children_are_flattened() {
        let json = r#"{"blockdevices": [
            {"name": "nvme0n1", "size": "476.9G", "type": "disk",
             "children": [
                {"name": "nvme0n1p1", "size": "1G", "type": "part", "mountpoint": "/boot"},
                {"name": "nvme0n1p2", "size": "475.9G", "type": "part",
                 "children": [
                    {"name": "vg-root", "size": "475.9G", "type": "lvm", "mountpoint": "/"}
                 ]}
             ]}
        ]}"#;
        let devices = build_devices(parse_lsblk(json).unwrap(), &[]);
        let names: Vec<&str> = devices[0]
            .partitions
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["nvme0n1p1", "nvme0n1p2", "vg-root"]);
        assert_eq!(devices[0].partitions[2].kind, "lvm");
    }

    #[test]
    fn mountpoints_list_form_is_accepted() {
        let json = r#"{"blockdevices": [
            {"name": "sdb", "size": "14.9G", "type": "disk", "mountpoints": [null, "/media/usb"]}
        ]}"#;
        let devices = build_devices(parse_lsblk(json).unwrap(), &[]);
        assert_eq!(devices[0].mountpoint.as_deref(), Some("/media/usb"));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = parse_lsblk("lsblk: unknown column").unwrap_err();
        assert!(matches!(err, CollectorError::Parse { what: "lsblk", .. }));
    }

    #[test]
    fn mounts_become_single_partition_devices() {
        let devices = devices_from_mounts(&mounts());
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "mmcblk0p2");
        assert_eq!(devices[0].size, "29G");
        assert_eq!(devices[0].partitions[0].kind, "ext4");
        assert!(devices[0].partitions[0].usage.is_some());
    }

    #[test]
    fn sizes_use_binary_units() {
        assert_eq!(format_size(512), "512B");
        assert_eq!(format_size(512 * 1024 * 1024), "512M");
        assert_eq!(format_size(31_890_145_280), "29.7G");
    }
}
