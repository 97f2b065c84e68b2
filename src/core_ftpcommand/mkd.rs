use crate::core_ftpcommand::error::SessionError;
use crate::core_ftpcommand::handlers::SessionContext;
use crate::helpers::{is_reserved_name, resolve_path, send_result};
use log::{error, info};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Creates `name` under `current`. The session's directory does not change.
pub async fn make_directory(current: &Path, name: &str) -> Result<PathBuf, SessionError> {
    if is_reserved_name(name) {
        return Err(SessionError::InvalidName(name.to_string()));
    }

    let dir_path = resolve_path(current, name);
    if fs::symlink_metadata(&dir_path).await.is_ok() {
        return Err(SessionError::DirectoryAlreadyExists(name.to_string()));
    }

    fs::create_dir(&dir_path).await.map_err(|e| {
        error!("Failed to create directory: {:?}, error: {}", dir_path, e);
        SessionError::OperationFailed {
            action: "create directory",
            reason: e.to_string(),
        }
    })?;
    Ok(dir_path)
}

/// Handles the MKD (Make Directory) FTP command.
pub async fn handle_mkd_command(ctx: &mut SessionContext, arg: &str) -> std::io::Result<()> {
    let result = make_directory(&ctx.session.current_dir, arg).await.map(|path| {
        info!("Directory created successfully: {:?}", path);
        format!("200 Directory created: {}.", arg)
    });
    send_result(&mut ctx.control, result).await
}
