use anyhow::Result;
use pi_dashboard::*;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let collection = &app_config.collection;

    let units = Arc::new(systemd_repo::SystemdRepo::new(collection.command_timeout()));
    let sources = aggregator::Sources {
        host: Arc::new(sysinfo_repo::SysinfoRepo::new(
            collection.cpu_sample(),
            &app_config.sensors.thermal_path,
            collection.command_timeout(),
        )),
        docker: Arc::new(docker_repo::DockerRepo::new(
            app_config.docker.socket.clone(),
            Duration::from_secs(app_config.docker.timeout_secs),
        )),
        tunnel: Arc::new(tunnel_repo::CloudflaredRepo::new(
            &app_config.cloudflared.unit,
            &app_config.cloudflared.binary,
            app_config.cloudflared.name_timeout(),
            units.clone(),
        )),
        units,
        registry: Arc::new(registry::ServiceRegistry::new(
            &app_config.services.path,
            Duration::from_secs(app_config.services.cache_secs),
        )),
    };
    tracing::info!(
        registry = %sources.registry.path().display(),
        cpu_sample_ms = collection.cpu_sample_ms,
        max_concurrent_probes = collection.max_concurrent_probes,
        "collectors configured"
    );
    let aggregator = Arc::new(aggregator::Aggregator::new(
        sources,
        collection.aggregator(),
    ));

    let app = routes::app(aggregator);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Health check: http://{}/api/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    tracing::info!("Received shutdown signal");
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Received shutdown signal");
}
