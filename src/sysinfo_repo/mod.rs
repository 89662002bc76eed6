// Host metrics via sysinfo, /sys and lsblk

mod block;
mod linux;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use sysinfo::{Disks, System};
use tracing::{instrument, warn};

use crate::command;
use crate::error::{Collected, CollectorError};
use crate::models::*;
use crate::sources::HostSource;

/// Stateless host collector: every read samples live OS state, so concurrent
/// requests never contend on a shared `System`.
pub struct SysinfoRepo {
    cpu_sample: Duration,
    thermal_path: PathBuf,
    command_timeout: Duration,
}

impl SysinfoRepo {
    pub fn new(
        cpu_sample: Duration,
        thermal_path: impl Into<PathBuf>,
        command_timeout: Duration,
    ) -> Self {
        Self {
            // Anything shorter than sysinfo's minimum reports 0% or 100% from a single tick.
            cpu_sample: cpu_sample.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
            thermal_path: thermal_path.into(),
            command_timeout,
        }
    }

    async fn mounted_filesystems(&self) -> Collected<Vec<block::MountedFs>> {
        let mounts: Vec<block::MountedFs> = tokio::task::spawn_blocking(|| {
            Disks::new_with_refreshed_list()
                .list()
                .iter()
                .map(|d| block::MountedFs {
                    name: d.name().to_string_lossy().into_owned(),
                    mountpoint: d.mount_point().to_string_lossy().into_owned(),
                    file_system: d.file_system().to_string_lossy().into_owned(),
                    total: d.total_space(),
                    available: d.available_space(),
                })
                .collect()
        })
        .await?;
        Ok(mounts)
    }
}

#[async_trait]
impl HostSource for SysinfoRepo {
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_system"))]
    async fn read_system(&self) -> Collected<SystemInfo> {
        let info = tokio::task::spawn_blocking(|| {
            let uptime_secs = Some(System::uptime()).filter(|s| *s > 0);
            SystemInfo {
                hostname: System::host_name().filter(|h| !h.is_empty()),
                uptime: uptime_secs.map(format_uptime),
                uptime_secs,
                platform: linux::read_platform_linux().or_else(System::long_os_version),
                architecture: std::env::consts::ARCH.to_string(),
                date: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            }
        })
        .await?;
        Ok(info)
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_cpu"))]
    async fn read_cpu(&self) -> Collected<CpuMetrics> {
        let window = self.cpu_sample;
        let thermal_path = self.thermal_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = System::new();
            sys.refresh_cpu_all();
            std::thread::sleep(window);
            sys.refresh_cpu_all();

            let core_count = sys.cpus().len() as u32;
            if core_count == 0 {
                return Err(CollectorError::Parse {
                    what: "cpu list",
                    reason: "no CPUs reported".into(),
                });
            }
            let usage = sys.global_cpu_usage() as f64;
            let frequency_mhz = sys
                .cpus()
                .first()
                .map(|c| c.frequency())
                .filter(|f| *f > 0);

            Ok(CpuMetrics {
                usage_percent: round_to(usage.clamp(0.0, 100.0), 1),
                temperature: linux::read_thermal_celsius(&thermal_path),
                core_count,
                frequency_mhz,
            })
        })
        .await?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_memory"))]
    async fn read_memory(&self) -> Collected<MemoryMetrics> {
        let sample = tokio::task::spawn_blocking(|| {
            let mut sys = System::new();
            sys.refresh_memory();
            MemorySample {
                total: sys.total_memory(),
                used: sys.used_memory(),
                available: sys.available_memory(),
            }
        })
        .await?;
        if sample.total == 0 {
            return Err(CollectorError::Parse {
                what: "memory counters",
                reason: "total memory reported as 0".into(),
            });
        }
        Ok(MemoryMetrics::from_sample(sample))
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_disk"))]
    async fn read_disk(&self) -> Collected<Vec<DiskDevice>> {
        let mounts = self.mounted_filesystems().await?;
        let listed = command::run("lsblk", block::LSBLK_ARGS, self.command_timeout)
            .await
            .and_then(|out| block::parse_lsblk(&out));
        match listed {
            Ok(devices) => Ok(block::build_devices(devices, &mounts)),
            Err(e) if !mounts.is_empty() => {
                warn!(error = %e, "lsblk unavailable; reporting mounted filesystems");
                Ok(block::devices_from_mounts(&mounts))
            }
            Err(e) => Err(e),
        }
    }
}

/// `"D days, HH hrs, MM mins, SS secs"`.
pub fn format_uptime(secs: u64) -> String {
    let (days, hours, minutes) = split_duration(secs);
    format!(
        "{} days, {:02} hrs, {:02} mins, {:02} secs",
        days,
        hours,
        minutes,
        secs % 60
    )
}

/// `"D days, HH hrs, MM mins"`, used for process uptimes.
pub fn format_process_uptime(secs: u64) -> String {
    let (days, hours, minutes) = split_duration(secs);
    format!("{} days, {:02} hrs, {:02} mins", days, hours, minutes)
}

fn split_duration(secs: u64) -> (u64, u64, u64) {
    (secs / 86_400, (secs % 86_400) / 3_600, (secs % 3_600) / 60)
}
