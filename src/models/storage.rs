// Storage / disk models

use serde::{Deserialize, Serialize};

use super::system::{bytes_to_gb, round_to};

/// Filesystem usage of one mountpoint, in GB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskUsage {
    pub used: f64,
    pub free: f64,
    pub total: f64,
    pub percent: f64,
}

impl DiskUsage {
    /// Builds usage from byte counts; `free` is the space available to unprivileged users.
    pub fn from_bytes(total: u64, available: u64) -> Self {
        let used = total.saturating_sub(available);
        let percent = if total > 0 {
            (used as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        Self {
            used: bytes_to_gb(used, 1),
            free: bytes_to_gb(available, 1),
            total: bytes_to_gb(total, 1),
            percent: round_to(percent, 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskPartition {
    pub name: String,
    /// Human-readable size as reported by the block layer (e.g. "29.7G").
    pub size: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub mountpoint: Option<String>,
    /// Absent when unmounted or when the filesystem couldn't be statted.
    pub usage: Option<DiskUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskDevice {
    pub name: String,
    pub size: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Set when the whole device carries a filesystem (no partition table).
    pub mountpoint: Option<String>,
    pub usage: Option<DiskUsage>,
    pub partitions: Vec<DiskPartition>,
}

/// Body of `/api/disk` and the `disk` field of a snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiskReport {
    pub devices: Vec<DiskDevice>,
    /// Set only when the disk collector failed as a whole.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
