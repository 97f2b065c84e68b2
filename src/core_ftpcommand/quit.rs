use crate::core_ftpcommand::handlers::SessionContext;
use crate::helpers::send_response;
use log::{error, info};

/// Handles the QUIT FTP command.
///
/// Only says goodbye; the session loop closes the connection once this returns.
pub async fn handle_quit_command(ctx: &mut SessionContext) -> std::io::Result<()> {
    info!("Received QUIT command from {}. Closing connection.", ctx.control.peer_addr());

    if let Err(e) = send_response(&mut ctx.control, "221 Goodbye.").await {
        error!("Failed to send QUIT response: {}", e);
        return Err(e);
    }
    Ok(())
}
