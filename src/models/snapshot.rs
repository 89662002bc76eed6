// Full snapshot served by /api/all

use serde::{Deserialize, Serialize};

use super::{
    CloudflaredStatus, CpuMetrics, DiskReport, DockerStatus, MemoryMetrics, ServiceStatus,
    SystemInfo,
};

/// One aggregation pass. Fields were sampled at slightly different instants;
/// `timestamp` (Unix ms) is taken once every source has settled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: u64,
    pub system: Option<SystemInfo>,
    pub cpu: Option<CpuMetrics>,
    pub memory: Option<MemoryMetrics>,
    pub disk: DiskReport,
    pub docker: DockerStatus,
    pub cloudflared: CloudflaredStatus,
    pub services: Vec<ServiceStatus>,
}
