use crate::core_ftpcommand::error::SessionError;
use crate::core_ftpcommand::handlers::SessionContext;
use crate::helpers::{is_reserved_name, resolve_path, send_result};
use log::info;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Renames `source` to `new_name` under `current`. Never overwrites.
pub async fn rename_to(source: &Path, current: &Path, new_name: &str) -> Result<PathBuf, SessionError> {
    if is_reserved_name(new_name) {
        return Err(SessionError::InvalidName(new_name.to_string()));
    }

    let target = resolve_path(current, new_name);
    if fs::symlink_metadata(&target).await.is_ok() {
        return Err(SessionError::TargetAlreadyExists(new_name.to_string()));
    }

    fs::rename(source, &target)
        .await
        .map_err(|e| SessionError::OperationFailed {
            action: "rename",
            reason: e.to_string(),
        })?;
    Ok(target)
}

/// Handles the RNTO (Rename To) FTP command.
///
/// The pending source is consumed by this command whatever the outcome, so a
/// failed RNTO releases the session.
pub async fn handle_rnto_command(ctx: &mut SessionContext, arg: &str) -> std::io::Result<()> {
    let result = match ctx.session.rename_from.take() {
        None => Err(SessionError::NoFileToRename),
        Some(source) => rename_to(&source, &ctx.session.current_dir, arg)
            .await
            .map(|target| {
                info!("Renamed {:?} to {:?}", source, target);
                format!("200 Renamed to {}.", arg)
            }),
    };
    send_result(&mut ctx.control, result).await
}
