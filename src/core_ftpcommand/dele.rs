use crate::core_ftpcommand::error::SessionError;
use crate::core_ftpcommand::handlers::SessionContext;
use crate::helpers::{resolve_path, send_result};
use log::info;
use std::path::Path;
use tokio::fs;

/// Deletes the regular file `name` under `current`.
pub async fn delete_file(current: &Path, name: &str) -> Result<(), SessionError> {
    let file_path = resolve_path(current, name);
    let metadata = fs::metadata(&file_path)
        .await
        .map_err(|_| SessionError::FileNotFound(name.to_string()))?;
    if !metadata.is_file() {
        return Err(SessionError::NotAFile(name.to_string()));
    }

    fs::remove_file(&file_path)
        .await
        .map_err(|e| SessionError::OperationFailed {
            action: "delete file",
            reason: e.to_string(),
        })
}

/// Handles the DELE (Delete File) FTP command.
pub async fn handle_dele_command(ctx: &mut SessionContext, arg: &str) -> std::io::Result<()> {
    let result = delete_file(&ctx.session.current_dir, arg).await.map(|()| {
        info!("File deleted: {}", arg);
        format!("200 File deleted: {}.", arg)
    });
    send_result(&mut ctx.control, result).await
}
