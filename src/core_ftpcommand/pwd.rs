// src/core_ftpcommand/pwd.rs
use crate::core_ftpcommand::error::SessionError;
use crate::core_ftpcommand::handlers::SessionContext;
use crate::helpers::send_result;
use tokio::fs;

pub async fn handle_pwd_command(ctx: &mut SessionContext) -> std::io::Result<()> {
    let current_dir = &ctx.session.current_dir;
    let result = match fs::metadata(current_dir).await {
        Ok(metadata) if metadata.is_dir() => {
            Ok(format!("200 Current directory: {}", current_dir.display()))
        }
        _ => Err(SessionError::CurrentDirectoryGone),
    };
    send_result(&mut ctx.control, result).await
}
