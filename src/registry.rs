// Service registry: editable list of systemd units shown on the dashboard.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::models::ServiceDescriptor;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid service registry: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("'services' key not found")]
    MissingServices,
    #[error("service #{0} has an empty name")]
    EmptyName(usize),
    #[error("duplicate service name '{0}'")]
    DuplicateName(String),
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    services: Option<Vec<ServiceDescriptor>>,
}

/// Built-in list used whenever the registry file can't be used.
pub fn default_services() -> Vec<ServiceDescriptor> {
    vec![
        ServiceDescriptor::new("ssh", "SSH Server", "Secure Shell daemon for remote access"),
        ServiceDescriptor::new("nginx", "Nginx", "Web server and reverse proxy"),
        ServiceDescriptor::new("docker", "Docker", "Container runtime platform"),
        ServiceDescriptor::new("cloudflared", "Cloudflared", "Cloudflare tunnel daemon"),
    ]
}

/// Parse and validate a registry document: `{"services": [{name, display_name?, description?}]}`.
pub fn parse_services(json: &str) -> Result<Vec<ServiceDescriptor>, RegistryError> {
    let file: RegistryFile = serde_json::from_str(json)?;
    let mut services = file.services.ok_or(RegistryError::MissingServices)?;

    let mut seen = HashSet::with_capacity(services.len());
    for (i, svc) in services.iter_mut().enumerate() {
        svc.name = svc.name.trim().to_string();
        if svc.name.is_empty() {
            return Err(RegistryError::EmptyName(i));
        }
        if !seen.insert(svc.name.clone()) {
            return Err(RegistryError::DuplicateName(svc.name.clone()));
        }
        if svc.display_name.is_empty() {
            svc.display_name = svc.name.clone();
        }
    }
    Ok(services)
}

pub async fn try_load_services(path: &Path) -> Result<Vec<ServiceDescriptor>, RegistryError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_services(&json)
}

/// Never fails: any problem with the file is logged and the defaults are returned.
pub async fn load_services(path: &Path) -> Vec<ServiceDescriptor> {
    match try_load_services(path).await {
        Ok(services) => services,
        Err(e) => {
            warn!(error = %e, path = %path.display(), "Using default services list");
            default_services()
        }
    }
}

struct Cached {
    loaded_at: Instant,
    services: Arc<[ServiceDescriptor]>,
}

/// Registry with an optional TTL. A reload swaps in a fresh `Arc`, so callers
/// holding the previous list keep a consistent view.
pub struct ServiceRegistry {
    path: PathBuf,
    ttl: Duration,
    cache: RwLock<Option<Cached>>,
}

impl ServiceRegistry {
    /// `ttl` of zero re-reads the file on every call.
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            cache: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn services(&self) -> Arc<[ServiceDescriptor]> {
        if self.ttl.is_zero() {
            return load_services(&self.path).await.into();
        }

        if let Some(cached) = self.cache.read().await.as_ref()
            && cached.loaded_at.elapsed() < self.ttl
        {
            return cached.services.clone();
        }

        let mut cache = self.cache.write().await;
        // Another request may have reloaded while we waited for the lock.
        if let Some(cached) = cache.as_ref()
            && cached.loaded_at.elapsed() < self.ttl
        {
            return cached.services.clone();
        }
        let services: Arc<[ServiceDescriptor]> = load_services(&self.path).await.into();
        debug!(count = services.len(), path = %self.path.display(), "service registry reloaded");
        *cache = Some(Cached {
            loaded_at: Instant::now(),
            services: services.clone(),
        });
        services
    }
}
