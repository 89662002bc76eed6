// Seams between the aggregator and the things it samples.
//
// Every source returns `Collected<T>`; the aggregator turns a failure into
// `T::unavailable` without per-source handling.

use async_trait::async_trait;

use crate::error::{Collected, CollectorError};
use crate::models::*;

/// Local OS metrics.
#[async_trait]
pub trait HostSource: Send + Sync {
    async fn read_system(&self) -> Collected<SystemInfo>;
    async fn read_cpu(&self) -> Collected<CpuMetrics>;
    async fn read_memory(&self) -> Collected<MemoryMetrics>;
    async fn read_disk(&self) -> Collected<Vec<DiskDevice>>;
}

/// Container runtime daemon.
#[async_trait]
pub trait ContainerProbe: Send + Sync {
    async fn docker_status(&self) -> Collected<DockerStatus>;
}

/// Tunnel daemon.
#[async_trait]
pub trait TunnelProbe: Send + Sync {
    async fn tunnel_status(&self) -> Collected<CloudflaredStatus>;
}

/// Init system; `unit` is free text from the registry.
#[async_trait]
pub trait UnitProbe: Send + Sync {
    async fn unit_state(&self, unit: &str) -> Collected<RuntimeState>;
}

/// Field-level representation of a source that produced nothing.
pub trait Fallback {
    fn unavailable(err: &CollectorError) -> Self;
}

impl<T> Fallback for Option<T> {
    fn unavailable(_: &CollectorError) -> Self {
        None
    }
}

impl Fallback for RuntimeState {
    fn unavailable(_: &CollectorError) -> Self {
        RuntimeState::Unknown
    }
}

impl Fallback for DockerStatus {
    fn unavailable(err: &CollectorError) -> Self {
        DockerStatus::unavailable(err.to_string())
    }
}

impl Fallback for CloudflaredStatus {
    fn unavailable(_: &CollectorError) -> Self {
        CloudflaredStatus::unknown()
    }
}

impl Fallback for DiskReport {
    fn unavailable(err: &CollectorError) -> Self {
        DiskReport {
            devices: Vec::new(),
            error: Some(err.to_string()),
        }
    }
}
