use crate::core_ftpcommand::handlers::SessionContext;
use crate::core_network::data_channel::passive_addr;
use crate::helpers::send_response;
use crate::session::TransferMode;
use log::debug;

/// Handles the PASV FTP command.
///
/// No listener is opened here; RETR/STOR bind the passive data port when they
/// run, one control port above the server's own.
pub async fn handle_pasv_command(ctx: &mut SessionContext) -> std::io::Result<()> {
    ctx.session.transfer_mode = TransferMode::Passive;

    let reply = match passive_addr(ctx.control.local_addr()) {
        Ok(addr) => {
            debug!("Passive data address for {}: {}", ctx.control.peer_addr(), addr);
            format!("200 Entering passive mode, data port {}.", addr.port())
        }
        Err(_) => "200 Entering passive mode.".to_string(),
    };
    send_response(&mut ctx.control, &reply).await
}
