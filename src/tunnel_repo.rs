// Cloudflare tunnel (cloudflared) status

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sysinfo::{ProcessesToUpdate, System};
use tracing::{debug, instrument};

use crate::command;
use crate::error::Collected;
use crate::models::{CloudflaredStatus, RuntimeState, TunnelState};
use crate::sources::{TunnelProbe, UnitProbe};
use crate::sysinfo_repo::format_process_uptime;

pub struct CloudflaredRepo {
    unit: String,
    binary: String,
    name_timeout: Duration,
    units: Arc<dyn UnitProbe>,
}

impl CloudflaredRepo {
    pub fn new(
        unit: impl Into<String>,
        binary: impl Into<String>,
        name_timeout: Duration,
        units: Arc<dyn UnitProbe>,
    ) -> Self {
        Self {
            unit: unit.into(),
            binary: binary.into(),
            name_timeout,
            units,
        }
    }

    /// Seconds the longest-running matching process has been alive.
    async fn process_uptime(&self) -> Collected<Option<u64>> {
        let needle = self.binary.rsplit('/').next().unwrap_or_default().to_string();
        let uptime = tokio::task::spawn_blocking(move || {
            let mut sys = System::new();
            sys.refresh_processes(ProcessesToUpdate::All, true);
            sys.processes()
                .values()
                .filter(|p| p.name().to_string_lossy().contains(needle.as_str()))
                .map(|p| p.run_time())
                .max()
        })
        .await?;
        Ok(uptime)
    }

    /// Optional detail: bounded by `name_timeout`, and any failure is just `None`.
    async fn tunnel_name(&self) -> Option<String> {
        match command::run(&self.binary, &["tunnel", "list"], self.name_timeout).await {
            Ok(out) => parse_tunnel_list(&out),
            Err(e) => {
                debug!(error = %e, "cloudflared tunnel list failed");
                None
            }
        }
    }
}

#[async_trait]
impl TunnelProbe for CloudflaredRepo {
    #[instrument(skip(self), fields(repo = "cloudflared", operation = "tunnel_status"))]
    async fn tunnel_status(&self) -> Collected<CloudflaredStatus> {
        // No systemd (or no such unit) is normal; the process table still answers.
        let unit_state = self.units.unit_state(&self.unit).await.unwrap_or_else(|e| {
            debug!(error = %e, unit = %self.unit, "unit state unavailable");
            RuntimeState::Unknown
        });
        let process_uptime = self.process_uptime().await?;

        let status = tunnel_state(unit_state, process_uptime.is_some());
        if status != TunnelState::Connected {
            return Ok(CloudflaredStatus {
                status,
                tunnel_name: None,
                uptime: None,
            });
        }
        // Status and uptime are settled before the name lookup runs.
        let uptime = process_uptime.map(format_process_uptime);
        Ok(CloudflaredStatus {
            status,
            tunnel_name: self.tunnel_name().await,
            uptime,
        })
    }
}

/// Unit running or a live process means connected; a stopped unit means
/// disconnected; with neither signal the tunnel is simply not installed.
fn tunnel_state(unit: RuntimeState, process_alive: bool) -> TunnelState {
    match (unit, process_alive) {
        (RuntimeState::Running, _) | (_, true) => TunnelState::Connected,
        (RuntimeState::Stopped, false) => TunnelState::Disconnected,
        (RuntimeState::Unknown, false) => TunnelState::Unknown,
    }
}

/// Name column of the first row of `cloudflared tunnel list`.
fn parse_tunnel_list(output: &str) -> Option<String> {
    let mut lines = output.lines().map(str::trim).filter(|l| !l.is_empty());
    lines.find(|l| {
        let mut cols = l.split_whitespace();
        cols.next() == Some("ID") && cols.next() == Some("NAME")
    })?;
    lines
        .next()?
        .split_whitespace()
        .nth(1)
        .map(str::to_string)
}
