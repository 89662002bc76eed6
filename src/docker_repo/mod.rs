// Docker runtime status via bollard

use std::time::Duration;

use async_trait::async_trait;
use bollard::Docker;
use bollard::query_parameters::ListContainersOptions;
use bollard::models::ContainerSummary as ApiContainer;
use tracing::{instrument, warn};

use crate::error::{Collected, CollectorError};
use crate::models::{ContainerState, ContainerSummary, DockerStatus};
use crate::sources::ContainerProbe;

/// Probes the Docker daemon. A client is built per call, so a daemon that
/// starts or stops between polls is picked up without a restart.
pub struct DockerRepo {
    socket: Option<String>,
    timeout: Duration,
}

impl DockerRepo {
    /// `socket` overrides the local defaults (`DOCKER_HOST`, then `/var/run/docker.sock`).
    pub fn new(socket: Option<String>, timeout: Duration) -> Self {
        Self { socket, timeout }
    }

    fn client(&self) -> Result<Docker, bollard::errors::Error> {
        match &self.socket {
            Some(path) => Docker::connect_with_unix(
                path,
                self.timeout.as_secs().max(1),
                bollard::API_DEFAULT_VERSION,
            ),
            None => Docker::connect_with_local_defaults(),
        }
    }

    async fn list_containers(&self) -> Collected<Vec<ContainerSummary>> {
        let docker = self.client()?;
        let options = ListContainersOptions {
            all: true,
            ..Default::default()
        };
        let containers = tokio::time::timeout(self.timeout, docker.list_containers(Some(options)))
            .await
            .map_err(|_| CollectorError::Timeout(self.timeout))??;
        Ok(containers.into_iter().map(summarize).collect())
    }

    /// Never fails: an unreachable daemon is `unknown` with the reason in `error`.
    #[instrument(skip(self), fields(repo = "docker", operation = "status"))]
    pub async fn status(&self) -> DockerStatus {
        match self.list_containers().await {
            Ok(containers) => DockerStatus::from_containers(containers),
            Err(e) => {
                warn!(error = %e, "Docker daemon unreachable");
                DockerStatus::unavailable(e.to_string())
            }
        }
    }
}

#[async_trait]
impl ContainerProbe for DockerRepo {
    async fn docker_status(&self) -> Collected<DockerStatus> {
        Ok(self.status().await)
    }
}

fn summarize(c: ApiContainer) -> ContainerSummary {
    let id = c.id.clone().unwrap_or_default();
    let name = c
        .names
        .as_ref()
        .and_then(|n| n.first())
        .cloned()
        .unwrap_or(id);
    let state = c
        .state
        .as_ref()
        .map(|s| ContainerState::from_docker(&s.to_string()))
        .unwrap_or(ContainerState::Unknown);
    ContainerSummary {
        name: name.trim_start_matches('/').to_string(),
        state,
        image: c.image.unwrap_or_else(|| "unknown".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuntimeState;

    fn api_container(name: &str, image: Option<&str>) -> ApiContainer {
        ApiContainer {
            id: Some("0123456789ab".into()),
            names: Some(vec![format!("/{}", name)]),
            image: image.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn summarize_strips_leading_slash_and_defaults_image() {
        let s = summarize(api_container("pihole", None));
        assert_eq!(s.name, "pihole");
        assert_eq!(s.image, "unknown");
        assert_eq!(s.state, ContainerState::Unknown);
    }

    #[test]
    fn summarize_falls_back_to_id_without_names() {
        let c = ApiContainer {
            id: Some("deadbeef".into()),
            ..Default::default()
        };
        assert_eq!(summarize(c).name, "deadbeef");
    }

    #[tokio::test]
    async fn missing_socket_reports_unknown_with_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let socket = dir.path().join("docker.sock");
        let repo = DockerRepo::new(
            Some(socket.to_string_lossy().into_owned()),
            Duration::from_secs(2),
        );
        let status = repo.status().await;
        assert_eq!(status.status, RuntimeState::Unknown);
        assert_eq!(status.container_count, 0);
        assert!(status.error.as_deref().is_some_and(|e| !e.is_empty()));
    }
}
