// Domain models (JSON contract of the dashboard API)

mod container;
mod service;
mod snapshot;
mod storage;
mod system;
mod tunnel;

pub use container::{ContainerState, ContainerSummary, DockerStatus};
pub use service::{RuntimeState, ServiceDescriptor, ServiceStatus};
pub use snapshot::Snapshot;
pub use storage::{DiskDevice, DiskPartition, DiskReport, DiskUsage};
pub use system::{CpuMetrics, MemoryMetrics, MemorySample, SystemInfo, bytes_to_gb, round_to};
pub use tunnel::{CloudflaredStatus, TunnelState};
