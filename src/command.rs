// Bounded external command execution (systemctl, lsblk, cloudflared)

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{Collected, CollectorError};

/// Runs `program args...` and returns stdout. The child is killed if the
/// deadline passes or the caller is dropped.
pub(crate) async fn run(program: &str, args: &[&str], limit: Duration) -> Collected<String> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| CollectorError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let output = match tokio::time::timeout(limit, child.wait_with_output()).await {
        Ok(output) => output?,
        Err(_) => return Err(CollectorError::Timeout(limit)),
    };
    if !output.status.success() {
        return Err(CollectorError::CommandFailed {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
