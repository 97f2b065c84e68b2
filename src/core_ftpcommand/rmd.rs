use crate::core_ftpcommand::error::SessionError;
use crate::core_ftpcommand::handlers::SessionContext;
use crate::helpers::{is_reserved_name, resolve_path, send_result};
use log::info;
use std::path::Path;
use tokio::fs;

/// Removes the empty directory `name` under `current`.
pub async fn remove_directory(current: &Path, name: &str) -> Result<(), SessionError> {
    if is_reserved_name(name) {
        return Err(SessionError::InvalidName(name.to_string()));
    }

    let dir_path = resolve_path(current, name);
    let metadata = fs::metadata(&dir_path)
        .await
        .map_err(|_| SessionError::DirectoryNotFound(name.to_string()))?;
    if !metadata.is_dir() {
        return Err(SessionError::NotADirectory(name.to_string()));
    }

    let failed = |e: std::io::Error| SessionError::OperationFailed {
        action: "remove directory",
        reason: e.to_string(),
    };
    let mut entries = fs::read_dir(&dir_path).await.map_err(failed)?;
    if entries.next_entry().await.map_err(failed)?.is_some() {
        return Err(SessionError::DirectoryNotEmpty(name.to_string()));
    }

    fs::remove_dir(&dir_path).await.map_err(failed)
}

/// Handles the RMD (Remove Directory) FTP command.
pub async fn handle_rmd_command(ctx: &mut SessionContext, arg: &str) -> std::io::Result<()> {
    let result = remove_directory(&ctx.session.current_dir, arg)
        .await
        .map(|()| {
            info!("Directory removed: {}", arg);
            format!("200 Directory removed: {}.", arg)
        });
    send_result(&mut ctx.control, result).await
}
