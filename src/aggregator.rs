// Snapshot aggregation: concurrent fan-out over every source with per-source
// timeouts. A failing source degrades its own field and nothing else.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::{FutureExt, StreamExt, stream};
use tracing::{instrument, warn};

use crate::error::{Collected, CollectorError};
use crate::models::*;
use crate::registry::ServiceRegistry;
use crate::sources::{ContainerProbe, Fallback, HostSource, TunnelProbe, UnitProbe};

/// Timing and fan-out limits for one aggregation pass.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Upper bound for each host collector and daemon probe.
    pub source_timeout: Duration,
    /// Upper bound for each per-service unit probe.
    pub probe_timeout: Duration,
    pub max_concurrent_probes: usize,
}

/// Everything the aggregator samples.
pub struct Sources {
    pub host: Arc<dyn HostSource>,
    pub docker: Arc<dyn ContainerProbe>,
    pub tunnel: Arc<dyn TunnelProbe>,
    pub units: Arc<dyn UnitProbe>,
    pub registry: Arc<ServiceRegistry>,
}

pub struct Aggregator {
    sources: Sources,
    config: AggregatorConfig,
    last_timestamp: AtomicU64,
}

impl Aggregator {
    pub fn new(sources: Sources, config: AggregatorConfig) -> Self {
        Self {
            sources,
            config,
            last_timestamp: AtomicU64::new(0),
        }
    }

    /// Samples every source concurrently. Never fails.
    #[instrument(skip(self), fields(operation = "collect"))]
    pub async fn collect(&self) -> Snapshot {
        let (system, cpu, memory, disk, docker, cloudflared, services) = tokio::join!(
            self.system(),
            self.cpu(),
            self.memory(),
            self.disk(),
            self.docker(),
            self.cloudflared(),
            self.services(),
        );
        Snapshot {
            timestamp: self.next_timestamp(),
            system,
            cpu,
            memory,
            disk,
            docker,
            cloudflared,
            services,
        }
    }

    pub async fn system(&self) -> Option<SystemInfo> {
        let host = &self.sources.host;
        self.settle("system", async { host.read_system().await.map(Some) })
            .await
    }

    pub async fn cpu(&self) -> Option<CpuMetrics> {
        let host = &self.sources.host;
        self.settle("cpu", async { host.read_cpu().await.map(Some) })
            .await
    }

    pub async fn memory(&self) -> Option<MemoryMetrics> {
        let host = &self.sources.host;
        self.settle("memory", async { host.read_memory().await.map(Some) })
            .await
    }

    pub async fn disk(&self) -> DiskReport {
        let host = &self.sources.host;
        self.settle("disk", async {
            let devices = host.read_disk().await?;
            Ok(DiskReport {
                devices,
                error: None,
            })
        })
        .await
    }

    pub async fn docker(&self) -> DockerStatus {
        self.settle("docker", self.sources.docker.docker_status())
            .await
    }

    pub async fn cloudflared(&self) -> CloudflaredStatus {
        self.settle("cloudflared", self.sources.tunnel.tunnel_status())
            .await
    }

    /// One unit probe per registered service, at most `max_concurrent_probes`
    /// in flight. Results keep registry order.
    pub async fn services(&self) -> Vec<ServiceStatus> {
        let registered = self.sources.registry.services().await;

        stream::iter(registered.iter().cloned())
            .map(|descriptor| self.probe_service(descriptor))
            .buffered(self.config.max_concurrent_probes.max(1))
            .collect()
            .await
    }

    /// Unit state for one registered service, bounded by `probe_timeout`.
    pub async fn probe_service(&self, descriptor: ServiceDescriptor) -> ServiceStatus {
        let runtime_state = settle_within(
            "service",
            self.config.probe_timeout,
            self.sources.units.unit_state(&descriptor.name),
        )
        .await;
        ServiceStatus {
            descriptor,
            runtime_state,
        }
    }

    async fn settle<T, F>(&self, source: &'static str, fut: F) -> T
    where
        T: Fallback,
        F: Future<Output = Collected<T>>,
    {
        settle_within(source, self.config.source_timeout, fut).await
    }

    /// Unix millis, strictly increasing across calls on this aggregator.
    fn next_timestamp(&self) -> u64 {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_else(|e| {
                warn!(error = %e, operation = "get_timestamp", "system time error");
                0
            });
        let mut prev = self.last_timestamp.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self.last_timestamp.compare_exchange_weak(
                prev,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }
}

/// Bounds `fut` by `limit`, catches panics, and maps every failure to the
/// field-level fallback for `T`.
async fn settle_within<T, F>(source: &'static str, limit: Duration, fut: F) -> T
where
    T: Fallback,
    F: Future<Output = Collected<T>>,
{
    let guarded = AssertUnwindSafe(fut).catch_unwind();
    let err = match tokio::time::timeout(limit, guarded).await {
        Ok(Ok(Ok(value))) => return value,
        Ok(Ok(Err(e))) => e,
        Ok(Err(panic)) => CollectorError::Panic(panic_message(panic.as_ref())),
        Err(_) => CollectorError::Timeout(limit),
    };
    warn!(source, error = %err, "source unavailable");
    T::unavailable(&err)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".into())
}
