//! Payload capture from an external command (`-e`).
//!
//! The command runs under `sh -c` with stdin closed and stderr passed
//! through. Its entire stdout becomes the outbound payload, captured before
//! the bridge loop starts.

use std::process::{Command, Stdio};

use crate::error::{BridgeError, Result};

/// Runs `cmd` through the shell and returns everything it wrote to stdout.
///
/// A command that cannot be spawned or exits unsuccessfully is an I/O
/// error; partial output from a failed command is discarded.
pub fn capture_output(cmd: &str) -> Result<Vec<u8>> {
    log::debug!("[command] Running: {}", cmd);

    let output = Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()
        .map_err(|e| BridgeError::io("spawn payload command", e))?;

    if !output.status.success() {
        return Err(BridgeError::io(
            "payload command",
            std::io::Error::other(format!("'{}' exited with {}", cmd, output.status)),
        ));
    }

    log::debug!("[command] Captured {} bytes", output.stdout.len());
    Ok(output.stdout)
}
