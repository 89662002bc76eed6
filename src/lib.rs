// Library for tests to access modules

pub mod aggregator;
mod command;
pub mod config;
pub mod docker_repo;
pub mod error;
pub mod models;
pub mod registry;
pub mod routes;
pub mod sources;
pub mod systemd_repo;
pub mod sysinfo_repo;
pub mod tunnel_repo;
