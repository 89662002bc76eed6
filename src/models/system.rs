// CPU, memory and system identity models

use serde::{Deserialize, Serialize};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Round `value` to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Binary (1024-based) byte to GB conversion, rounded to `decimals` places.
pub fn bytes_to_gb(bytes: u64, decimals: i32) -> f64 {
    round_to(bytes as f64 / BYTES_PER_GB, decimals)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuMetrics {
    pub usage_percent: f64,
    /// Degrees Celsius; `None` when the host exposes no thermal sensor.
    pub temperature: Option<f64>,
    pub core_count: u32,
    pub frequency_mhz: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetrics {
    pub total: f64,
    pub used: f64,
    pub available: f64,
    pub percent: f64,
}

/// Raw memory counters in bytes, as reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySample {
    pub total: u64,
    pub used: u64,
    pub available: u64,
}

impl MemoryMetrics {
    /// Converts a raw sample. `percent` follows the OS availability accounting
    /// (`total - available`), so reclaimable caches counted in `used` don't inflate it.
    pub fn from_sample(sample: MemorySample) -> Self {
        let percent = if sample.total > 0 {
            let in_use = sample.total.saturating_sub(sample.available);
            (in_use as f64 / sample.total as f64) * 100.0
        } else {
            0.0
        };
        Self {
            total: bytes_to_gb(sample.total, 2),
            used: bytes_to_gb(sample.used, 2),
            available: bytes_to_gb(sample.available, 2),
            percent: round_to(percent.clamp(0.0, 100.0), 1),
        }
    }
}

/// Host identity plus uptime; read fresh on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub hostname: Option<String>,
    /// Formatted as `"D days, HH hrs, MM mins, SS secs"`.
    pub uptime: Option<String>,
    pub uptime_secs: Option<u64>,
    /// Distribution name, e.g. "Debian GNU/Linux 12 (bookworm)".
    pub platform: Option<String>,
    pub architecture: String,
    /// Local wall-clock time, `YYYY-MM-DD HH:MM:SS`.
    pub date: String,
}
