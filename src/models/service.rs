// Registered service models

use serde::{Deserialize, Serialize};

/// Three-valued status shared by containers, units and registered services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeState {
    Running,
    Stopped,
    Unknown,
}

/// One entry of the service registry. `name` is the systemd unit to query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

impl ServiceDescriptor {
    pub fn new(name: &str, display_name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
        }
    }
}

/// Wire shape: `{name, display_name, description, status}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    #[serde(flatten)]
    pub descriptor: ServiceDescriptor,
    #[serde(rename = "status")]
    pub runtime_state: RuntimeState,
}
