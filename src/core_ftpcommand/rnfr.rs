use crate::core_ftpcommand::error::SessionError;
use crate::core_ftpcommand::handlers::SessionContext;
use crate::helpers::{is_reserved_name, resolve_path, send_result};
use log::info;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Validates the rename source and returns its resolved path.
pub async fn rename_source(current: &Path, name: &str) -> Result<PathBuf, SessionError> {
    if is_reserved_name(name) {
        return Err(SessionError::InvalidName(name.to_string()));
    }

    let path = resolve_path(current, name);
    let metadata = fs::metadata(&path)
        .await
        .map_err(|_| SessionError::FileNotFound(name.to_string()))?;
    if !metadata.is_file() && !metadata.is_dir() {
        return Err(SessionError::NotAFileOrDirectory(name.to_string()));
    }
    Ok(path)
}

/// Handles the RNFR (Rename From) FTP command.
///
/// On success the session accepts nothing but RNTO (or QUIT) until the rename completes.
pub async fn handle_rnfr_command(ctx: &mut SessionContext, arg: &str) -> std::io::Result<()> {
    let result = rename_source(&ctx.session.current_dir, arg)
        .await
        .map(|path| {
            info!("Rename pending for {:?}", path);
            ctx.session.rename_from = Some(path);
            format!("200 Ready to rename {}, send RNTO.", arg)
        });
    send_result(&mut ctx.control, result).await
}
