// Cloudflare tunnel models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TunnelState {
    Connected,
    Disconnected,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudflaredStatus {
    pub status: TunnelState,
    pub tunnel_name: Option<String>,
    /// Process uptime, formatted `"D days, HH hrs, MM mins"`.
    pub uptime: Option<String>,
}

impl CloudflaredStatus {
    pub fn unknown() -> Self {
        Self {
            status: TunnelState::Unknown,
            tunnel_name: None,
            uptime: None,
        }
    }

    pub fn disconnected() -> Self {
        Self {
            status: TunnelState::Disconnected,
            tunnel_name: None,
            uptime: None,
        }
    }
}
