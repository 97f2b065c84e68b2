use crate::constants::{MIN_DEFAULT_DATA_PORT, MIN_EXPLICIT_DATA_PORT};
use crate::core_ftpcommand::error::SessionError;
use crate::core_ftpcommand::handlers::SessionContext;
use crate::helpers::send_result;
use crate::session::TransferMode;
use log::info;

/// Works out the active-mode data port.
///
/// Without an argument the port is the peer's control port + 1, which must be
/// at least 1023. An explicit port must be at least 1024.
pub fn resolve_port(arg: &str, peer_port: u16) -> Result<u16, SessionError> {
    let arg = arg.trim();
    if arg.is_empty() {
        return match peer_port.checked_add(1) {
            Some(port) if port >= MIN_DEFAULT_DATA_PORT => Ok(port),
            _ => Err(SessionError::InvalidPort(format!("{}+1", peer_port))),
        };
    }

    match arg.parse::<u16>() {
        Ok(port) if port >= MIN_EXPLICIT_DATA_PORT => Ok(port),
        _ => Err(SessionError::InvalidPort(arg.to_string())),
    }
}

/// Handles the PORT (Active Mode) FTP command.
pub async fn handle_port_command(ctx: &mut SessionContext, arg: &str) -> std::io::Result<()> {
    let result = resolve_port(arg, ctx.control.peer_addr().port()).map(|port| {
        ctx.session.transfer_mode = TransferMode::Active(port);
        info!("Active mode, {} will listen on port {}", ctx.control.peer_addr().ip(), port);
        format!("200 PORT command successful, data port {}.", port)
    });
    send_result(&mut ctx.control, result).await
}
