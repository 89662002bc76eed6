// Linux-specific helpers: thermal zone, /etc/os-release.

use std::path::Path;

use crate::models::round_to;

/// Read a thermal-zone file (millidegrees Celsius). `None` when the sensor
/// is missing or reports something unparsable.
pub(super) fn read_thermal_celsius(path: &Path) -> Option<f64> {
    let raw = std::fs::read_to_string(path).ok()?;
    parse_thermal(&raw)
}

fn parse_thermal(raw: &str) -> Option<f64> {
    let millidegrees = raw.trim().parse::<f64>().ok()?;
    Some(round_to(millidegrees / 1000.0, 1))
}

/// Distribution name from /etc/os-release (Linux).
pub(super) fn read_platform_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/etc/os-release").ok()?;
        parse_os_release(&content)
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// `PRETTY_NAME`, falling back to `NAME`.
fn parse_os_release(content: &str) -> Option<String> {
    let value_of = |key: &str| {
        content.lines().find_map(|line| {
            let v = line.trim().strip_prefix(key)?.strip_prefix('=')?;
            let v = v.trim().trim_matches('"').trim_matches('\'');
            (!v.is_empty()).then(|| v.to_string())
        })
    };
    value_of("PRETTY_NAME").or_else(|| value_of("NAME"))
}
