use serde::Deserialize;
use std::time::Duration;

use crate::aggregator::AggregatorConfig;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub services: ServicesConfig,
    pub collection: CollectionConfig,
    pub sensors: SensorsConfig,
    pub docker: DockerConfig,
    pub cloudflared: CloudflaredConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5555,
            host: "0.0.0.0".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// JSON registry: `{"services": [{name, display_name, description}]}`.
    pub path: String,
    /// 0 re-reads the registry on every request.
    pub cache_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            path: "config/services.json".into(),
            cache_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// CPU usage sampling window.
    pub cpu_sample_ms: u64,
    /// Upper bound for each host collector and daemon probe.
    pub source_timeout_ms: u64,
    /// Upper bound for each registered-service probe.
    pub probe_timeout_ms: u64,
    /// Upper bound for external commands (lsblk, systemctl, cloudflared).
    pub command_timeout_ms: u64,
    pub max_concurrent_probes: usize,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            cpu_sample_ms: 1000,
            source_timeout_ms: 10_000,
            probe_timeout_ms: 5000,
            command_timeout_ms: 4000,
            max_concurrent_probes: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    /// Thermal zone file in millidegrees Celsius.
    pub thermal_path: String,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            thermal_path: "/sys/class/thermal/thermal_zone0/temp".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Unix socket path; unset uses DOCKER_HOST or the platform default.
    pub socket: Option<String>,
    pub timeout_secs: u64,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            socket: None,
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CloudflaredConfig {
    pub unit: String,
    pub binary: String,
    /// Upper bound for `cloudflared tunnel list`; on expiry only `tunnel_name` is lost.
    pub name_timeout_ms: u64,
}

impl Default for CloudflaredConfig {
    fn default() -> Self {
        Self {
            unit: "cloudflared".into(),
            binary: "cloudflared".into(),
            name_timeout_ms: 3000,
        }
    }
}

impl CollectionConfig {
    pub fn cpu_sample(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn aggregator(&self) -> AggregatorConfig {
        AggregatorConfig {
            source_timeout: Duration::from_millis(self.source_timeout_ms),
            probe_timeout: Duration::from_millis(self.probe_timeout_ms),
            max_concurrent_probes: self.max_concurrent_probes,
        }
    }
}

impl CloudflaredConfig {
    pub fn name_timeout(&self) -> Duration {
        Duration::from_millis(self.name_timeout_ms)
    }
}

impl AppConfig {
    /// Reads `CONFIG_FILE` (default `config.toml`). Without `CONFIG_FILE` and
    /// without a `config.toml`, the built-in defaults apply.
    pub fn load() -> anyhow::Result<Self> {
        let explicit = std::env::var("CONFIG_FILE").ok();
        let path = explicit.clone().unwrap_or_else(|| "config.toml".into());
        if explicit.is_none() && !std::path::Path::new(&path).exists() {
            tracing::info!("No config.toml found; using defaults");
            return Ok(Self::default());
        }
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.server.host.is_empty(),
            "server.host must be non-empty"
        );
        anyhow::ensure!(
            !self.services.path.is_empty(),
            "services.path must be non-empty"
        );
        anyhow::ensure!(
            self.collection.cpu_sample_ms > 0,
            "collection.cpu_sample_ms must be > 0, got {}",
            self.collection.cpu_sample_ms
        );
        anyhow::ensure!(
            self.collection.source_timeout_ms > self.collection.cpu_sample_ms,
            "collection.source_timeout_ms must exceed collection.cpu_sample_ms ({}), got {}",
            self.collection.cpu_sample_ms,
            self.collection.source_timeout_ms
        );
        anyhow::ensure!(
            self.collection.probe_timeout_ms > 0,
            "collection.probe_timeout_ms must be > 0, got {}",
            self.collection.probe_timeout_ms
        );
        anyhow::ensure!(
            self.collection.command_timeout_ms > 0,
            "collection.command_timeout_ms must be > 0, got {}",
            self.collection.command_timeout_ms
        );
        anyhow::ensure!(
            self.collection.max_concurrent_probes > 0,
            "collection.max_concurrent_probes must be > 0, got {}",
            self.collection.max_concurrent_probes
        );
        anyhow::ensure!(
            self.docker.timeout_secs > 0,
            "docker.timeout_secs must be > 0, got {}",
            self.docker.timeout_secs
        );
        anyhow::ensure!(
            !self.cloudflared.binary.is_empty(),
            "cloudflared.binary must be non-empty"
        );
        anyhow::ensure!(
            self.cloudflared.name_timeout_ms > 0,
            "cloudflared.name_timeout_ms must be > 0, got {}",
            self.cloudflared.name_timeout_ms
        );
        // The tunnel probe runs the unit query and then the name lookup.
        let tunnel_budget = self
            .collection
            .command_timeout_ms
            .saturating_add(self.cloudflared.name_timeout_ms);
        anyhow::ensure!(
            self.collection.source_timeout_ms > tunnel_budget,
            "collection.source_timeout_ms must exceed collection.command_timeout_ms + cloudflared.name_timeout_ms ({}), got {}",
            tunnel_budget,
            self.collection.source_timeout_ms
        );
        Ok(())
    }
}
