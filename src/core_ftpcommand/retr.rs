use crate::core_ftpcommand::error::SessionError;
use crate::core_ftpcommand::handlers::{report_transfer, SessionContext};
use crate::core_network::transfer::send_file;
use crate::helpers::{resolve_path, send_response, send_result};
use log::{error, info};
use std::path::Path;
use tokio::fs::{self, File};

/// Opens the file RETR sends and sizes it, before any data connection exists.
pub async fn open_for_send(path: &Path, name: &str) -> Result<(File, u64), SessionError> {
    let metadata = fs::metadata(path)
        .await
        .map_err(|_| SessionError::FileNotFound(name.to_string()))?;
    if !metadata.is_file() {
        return Err(SessionError::NotAFile(name.to_string()));
    }

    let file = File::open(path).await.map_err(|e| {
        error!("File could not be opened: {:?}, error: {}", path, e);
        SessionError::OperationFailed {
            action: "open file",
            reason: e.to_string(),
        }
    })?;
    Ok((file, metadata.len()))
}

/// Handles the RETR (Retrieve) FTP command.
///
/// Replies 200 once the file and the data connection are ready, sends the
/// file as the sender side of the transfer, then waits for the client's DONE.
pub async fn handle_retr_command(ctx: &mut SessionContext, arg: &str) -> std::io::Result<()> {
    let file_path = resolve_path(&ctx.session.current_dir, arg);
    let (file, size) = match open_for_send(&file_path, arg).await {
        Ok(opened) => opened,
        Err(e) => return send_result(&mut ctx.control, Err(e)).await,
    };

    let Some(pending) = ctx.prepare_data_channel().await? else {
        return Ok(());
    };

    send_response(
        &mut ctx.control,
        &format!("200 Opening data connection for {} ({} bytes).", arg, size),
    )
    .await?;
    info!("Sending file: {:?}", file_path);

    let server = ctx.server.clone();
    let outcome = match pending.open(&server.data_channel).await {
        Ok(data) => send_file(&mut ctx.control, data, file, size, &server.transfer).await,
        Err(e) => Err(e),
    };
    report_transfer(outcome, &file_path);

    ctx.finish_transfer().await
}
