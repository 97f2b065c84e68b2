use crate::core_ftpcommand::error::SessionError;
use crate::core_network::control::ControlChannel;
use anyhow::{Context, Result};
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Sends a response to the client.
pub async fn send_response(control: &mut ControlChannel, message: &str) -> std::io::Result<()> {
    control.send_message(message).await
}

/// Sends the success reply, or the reply line matching the rejection.
pub async fn send_result(
    control: &mut ControlChannel,
    result: Result<String, SessionError>,
) -> std::io::Result<()> {
    match result {
        Ok(reply) => control.send_message(&reply).await,
        Err(e) => {
            warn!("Rejected command from {}: {}", control.peer_addr(), e);
            control.send_message(&e.to_ftp_response()).await
        }
    }
}

/// Resolves a command argument against the session's current directory.
pub fn resolve_path(current_dir: &Path, arg: &str) -> PathBuf {
    current_dir.join(arg)
}

/// `.` and `..` can't be created, removed or renamed.
pub fn is_reserved_name(name: &str) -> bool {
    matches!(name, "." | "..")
}

pub fn load_banner(path: &Path) -> Result<String> {
    let banner = fs::read_to_string(path)
        .map_err(|e| {
            error!("Failed to read banner file: {}: {}", path.display(), e);
            anyhow::Error::new(e)
        })
        .with_context(|| format!("Failed to read banner file: {}", path.display()))?;

    if banner.trim().is_empty() {
        error!("Banner file is empty: {}", path.display());
        return Err(anyhow::Error::msg("Banner file is empty."));
    }

    info!("Banner file loaded successfully: {}", path.display());
    Ok(banner)
}
