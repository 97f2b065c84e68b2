use crate::core_ftpcommand::error::SessionError;
use crate::core_ftpcommand::handlers::SessionContext;
use crate::helpers::{resolve_path, send_result};
use log::info;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Works out the directory CWD moves to.
///
/// `.` stays put and `..` takes the parent without any bound, so the root is its
/// own parent. Anything else must be an existing directory and comes back canonicalized.
pub async fn change_directory(current: &Path, arg: &str) -> Result<PathBuf, SessionError> {
    match arg {
        "." => Ok(current.to_path_buf()),
        ".." => Ok(current.parent().unwrap_or(current).to_path_buf()),
        _ => {
            let target = resolve_path(current, arg);
            let metadata = fs::metadata(&target)
                .await
                .map_err(|_| SessionError::DirectoryNotFound(arg.to_string()))?;
            if !metadata.is_dir() {
                return Err(SessionError::NotADirectory(arg.to_string()));
            }
            fs::canonicalize(&target)
                .await
                .map_err(|e| SessionError::OperationFailed {
                    action: "change directory",
                    reason: e.to_string(),
                })
        }
    }
}

/// Moves the session and builds the success reply.
pub(crate) async fn move_to(ctx: &mut SessionContext, arg: &str) -> std::io::Result<()> {
    let outcome = change_directory(&ctx.session.current_dir, arg).await;
    let result = outcome.map(|new_dir| {
        info!("Directory changed to: {}", new_dir.display());
        let reply = format!("200 Directory changed to {}.", new_dir.display());
        ctx.session.current_dir = new_dir;
        reply
    });
    send_result(&mut ctx.control, result).await
}

pub async fn handle_cwd_command(ctx: &mut SessionContext, arg: &str) -> std::io::Result<()> {
    move_to(ctx, arg).await
}
