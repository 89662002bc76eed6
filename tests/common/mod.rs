// Shared test helpers: in-memory sources and an aggregator wired to them.

#![allow(dead_code)]

use async_trait::async_trait;
use pi_dashboard::aggregator::{Aggregator, AggregatorConfig, Sources};
use pi_dashboard::error::{Collected, CollectorError};
use pi_dashboard::models::*;
use pi_dashboard::registry::ServiceRegistry;
use pi_dashboard::sources::{ContainerProbe, HostSource, TunnelProbe, UnitProbe};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

fn unavailable(what: &str) -> CollectorError {
    CollectorError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("{} not available", what),
    ))
}

pub fn system_info() -> SystemInfo {
    SystemInfo {
        hostname: Some("raspberrypi".into()),
        uptime: Some("1 days, 02 hrs, 03 mins, 04 secs".into()),
        uptime_secs: Some(93_784),
        platform: Some("Debian GNU/Linux 12 (bookworm)".into()),
        architecture: "aarch64".into(),
        date: "2024-05-01 12:00:00".into(),
    }
}

pub fn cpu_metrics(temperature: Option<f64>) -> CpuMetrics {
    CpuMetrics {
        usage_percent: 12.5,
        temperature,
        core_count: 4,
        frequency_mhz: Some(1800),
    }
}

pub fn memory_metrics() -> MemoryMetrics {
    MemoryMetrics {
        total: 7.63,
        used: 2.1,
        available: 5.2,
        percent: 31.8,
    }
}

pub fn disk_devices() -> Vec<DiskDevice> {
    vec![DiskDevice {
        name: "mmcblk0".into(),
        size: "29.7G".into(),
        kind: "disk".into(),
        mountpoint: None,
        usage: None,
        partitions: vec![
            DiskPartition {
                name: "mmcblk0p1".into(),
                size: "512M".into(),
                kind: "part".into(),
                mountpoint: Some("/boot/firmware".into()),
                usage: Some(DiskUsage {
                    used: 0.1,
                    free: 0.4,
                    total: 0.5,
                    percent: 12.4,
                }),
            },
            DiskPartition {
                name: "mmcblk0p2".into(),
                size: "29.2G".into(),
                kind: "part".into(),
                mountpoint: None,
                usage: None,
            },
        ],
    }]
}

/// Host source with canned values. `None` fields fail with an I/O error.
pub struct FakeHost {
    pub system: Option<SystemInfo>,
    pub cpu: Option<CpuMetrics>,
    pub memory: Option<MemoryMetrics>,
    pub disk: Option<Vec<DiskDevice>>,
    pub panic_on_cpu: bool,
    pub cpu_delay: Duration,
}

impl FakeHost {
    pub fn healthy() -> Self {
        Self {
            system: Some(system_info()),
            cpu: Some(cpu_metrics(Some(48.3))),
            memory: Some(memory_metrics()),
            disk: Some(disk_devices()),
            panic_on_cpu: false,
            cpu_delay: Duration::ZERO,
        }
    }

    pub fn broken() -> Self {
        Self {
            system: None,
            cpu: None,
            memory: None,
            disk: None,
            panic_on_cpu: false,
            cpu_delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl HostSource for FakeHost {
    async fn read_system(&self) -> Collected<SystemInfo> {
        self.system.clone().ok_or_else(|| unavailable("system"))
    }

    async fn read_cpu(&self) -> Collected<CpuMetrics> {
        if self.panic_on_cpu {
            panic!("cpu sensor exploded");
        }
        if !self.cpu_delay.is_zero() {
            tokio::time::sleep(self.cpu_delay).await;
        }
        self.cpu.clone().ok_or_else(|| unavailable("cpu"))
    }

    async fn read_memory(&self) -> Collected<MemoryMetrics> {
        self.memory.clone().ok_or_else(|| unavailable("memory"))
    }

    async fn read_disk(&self) -> Collected<Vec<DiskDevice>> {
        self.disk.clone().ok_or_else(|| unavailable("lsblk"))
    }
}

/// Docker probe returning a fixed status.
pub struct FakeDocker(pub DockerStatus);

impl FakeDocker {
    pub fn with_containers(running: usize, stopped: usize) -> Self {
        let mut containers = Vec::new();
        for i in 0..running {
            containers.push(ContainerSummary {
                name: format!("app{}", i),
                state: ContainerState::Running,
                image: "nginx:latest".into(),
            });
        }
        for i in 0..stopped {
            containers.push(ContainerSummary {
                name: format!("old{}", i),
                state: ContainerState::Exited,
                image: "busybox".into(),
            });
        }
        Self(DockerStatus::from_containers(containers))
    }
}

#[async_trait]
impl ContainerProbe for FakeDocker {
    async fn docker_status(&self) -> Collected<DockerStatus> {
        Ok(self.0.clone())
    }
}

/// Tunnel probe returning a fixed status, or failing when `None`.
pub struct FakeTunnel(pub Option<CloudflaredStatus>);

#[async_trait]
impl TunnelProbe for FakeTunnel {
    async fn tunnel_status(&self) -> Collected<CloudflaredStatus> {
        self.0.clone().ok_or_else(|| unavailable("cloudflared"))
    }
}

/// Unit probe backed by a map. Unlisted units fail like a missing unit would.
/// Tracks the peak number of concurrent calls.
#[derive(Default)]
pub struct FakeUnits {
    pub states: HashMap<String, RuntimeState>,
    pub delays: HashMap<String, Duration>,
    pub default_delay: Duration,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl FakeUnits {
    pub fn with_states(states: &[(&str, RuntimeState)]) -> Self {
        Self {
            states: states
                .iter()
                .map(|(n, s)| (n.to_string(), *s))
                .collect(),
            ..Default::default()
        }
    }

    pub fn peak(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UnitProbe for FakeUnits {
    async fn unit_state(&self, unit: &str) -> Collected<RuntimeState> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .delays
            .get(unit)
            .copied()
            .unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.states.get(unit).copied().ok_or_else(|| CollectorError::Parse {
            what: "systemctl show",
            reason: format!("unit {} not found", unit),
        })
    }
}

pub fn test_config() -> AggregatorConfig {
    AggregatorConfig {
        source_timeout: Duration::from_millis(500),
        probe_timeout: Duration::from_millis(200),
        max_concurrent_probes: 4,
    }
}

/// Writes a registry file listing `names` and returns its directory (keep it alive).
pub fn registry_with(names: &[&str]) -> (Arc<ServiceRegistry>, TempDir) {
    let dir = TempDir::new().unwrap();
    let services: Vec<serde_json::Value> = names
        .iter()
        .map(|n| serde_json::json!({"name": n, "display_name": n.to_uppercase(), "description": ""}))
        .collect();
    let path = dir.path().join("services.json");
    std::fs::write(&path, serde_json::json!({ "services": services }).to_string()).unwrap();
    (registry_at(&path), dir)
}

pub fn registry_at(path: &Path) -> Arc<ServiceRegistry> {
    Arc::new(ServiceRegistry::new(path, Duration::ZERO))
}

pub fn aggregator(
    host: impl HostSource + 'static,
    docker: impl ContainerProbe + 'static,
    tunnel: impl TunnelProbe + 'static,
    units: Arc<FakeUnits>,
    registry: Arc<ServiceRegistry>,
    config: AggregatorConfig,
) -> Aggregator {
    Aggregator::new(
        Sources {
            host: Arc::new(host),
            docker: Arc::new(docker),
            tunnel: Arc::new(tunnel),
            units,
            registry,
        },
        config,
    )
}

/// All sources healthy; services `ssh` (running) and `nginx` (stopped).
pub fn healthy_aggregator() -> (Aggregator, TempDir) {
    let (registry, dir) = registry_with(&["ssh", "nginx"]);
    let units = Arc::new(FakeUnits::with_states(&[
        ("ssh", RuntimeState::Running),
        ("nginx", RuntimeState::Stopped),
    ]));
    let agg = aggregator(
        FakeHost::healthy(),
        FakeDocker::with_containers(2, 1),
        FakeTunnel(Some(CloudflaredStatus::disconnected())),
        units,
        registry,
        test_config(),
    );
    (agg, dir)
}
