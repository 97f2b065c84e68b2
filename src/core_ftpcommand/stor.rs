use crate::core_ftpcommand::handlers::{report_transfer, SessionContext};
use crate::core_network::transfer::receive_file;
use crate::helpers::{resolve_path, send_response};
use log::info;

/// Handles the STOR (Store) FTP command.
///
/// There is no pre-check: an existing file of that name is overwritten.
pub async fn handle_stor_command(ctx: &mut SessionContext, arg: &str) -> std::io::Result<()> {
    let file_path = resolve_path(&ctx.session.current_dir, arg);

    let Some(pending) = ctx.prepare_data_channel().await? else {
        return Ok(());
    };

    send_response(&mut ctx.control, &format!("200 Ready to receive {}.", arg)).await?;
    info!("Receiving file: {:?}", file_path);

    let server = ctx.server.clone();
    let outcome = match pending.open(&server.data_channel).await {
        Ok(data) => receive_file(&mut ctx.control, data, &file_path, &server.transfer).await,
        Err(e) => Err(e),
    };
    report_transfer(outcome, &file_path);

    ctx.finish_transfer().await
}
