// Docker models

use serde::{Deserialize, Serialize};

use super::service::RuntimeState;

/// Docker container state; serializes to lowercase JSON (e.g. "running").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Running,
    Exited,
    Paused,
    Restarting,
    Created,
    Dead,
    #[serde(other)]
    Unknown,
}

impl ContainerState {
    /// Parse from Docker API state string (e.g. "running", "exited").
    pub fn from_docker(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "running" => ContainerState::Running,
            "exited" => ContainerState::Exited,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "created" => ContainerState::Created,
            "dead" => ContainerState::Dead,
            _ => ContainerState::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub name: String,
    pub state: ContainerState,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockerStatus {
    pub status: RuntimeState,
    pub container_count: usize,
    pub running_count: usize,
    pub containers: Vec<ContainerSummary>,
    /// Set exactly when the probe could not complete.
    pub error: Option<String>,
}

impl DockerStatus {
    /// Daemon reachable: `running`, even with zero containers.
    pub fn from_containers(containers: Vec<ContainerSummary>) -> Self {
        let running_count = containers
            .iter()
            .filter(|c| c.state == ContainerState::Running)
            .count();
        Self {
            status: RuntimeState::Running,
            container_count: containers.len(),
            running_count,
            containers,
            error: None,
        }
    }

    /// Daemon unreachable or the listing failed.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            status: RuntimeState::Unknown,
            container_count: 0,
            running_count: 0,
            containers: Vec::new(),
            error: Some(reason.into()),
        }
    }
}
