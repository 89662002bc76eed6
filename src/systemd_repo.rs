// systemd unit state via systemctl

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use crate::command;
use crate::error::Collected;
use crate::models::RuntimeState;
use crate::sources::UnitProbe;

pub struct SystemdRepo {
    command_timeout: Duration,
}

impl SystemdRepo {
    pub fn new(command_timeout: Duration) -> Self {
        Self { command_timeout }
    }
}

#[async_trait]
impl UnitProbe for SystemdRepo {
    #[instrument(skip(self), fields(repo = "systemd", operation = "unit_state"))]
    async fn unit_state(&self, unit: &str) -> Collected<RuntimeState> {
        // `--` keeps registry text from being read as a systemctl option.
        let out = command::run(
            "systemctl",
            &["show", "--property=LoadState,ActiveState", "--", unit],
            self.command_timeout,
        )
        .await?;
        Ok(parse_unit_state(&out))
    }
}

/// Maps `systemctl show` output to a runtime state. Units systemd has never
/// heard of are `unknown`, not `stopped`.
pub fn parse_unit_state(output: &str) -> RuntimeState {
    let mut load_state = None;
    let mut active_state = None;
    for line in output.lines() {
        if let Some(v) = line.trim().strip_prefix("LoadState=") {
            load_state = Some(v);
        } else if let Some(v) = line.trim().strip_prefix("ActiveState=") {
            active_state = Some(v);
        }
    }

    if matches!(load_state, None | Some("not-found")) {
        return RuntimeState::Unknown;
    }
    match active_state {
        Some("active" | "reloading") => RuntimeState::Running,
        Some("inactive" | "failed" | "activating" | "deactivating") => RuntimeState::Stopped,
        _ => RuntimeState::Unknown,
    }
}
