use crate::core_ftpcommand::error::SessionError;
use crate::core_ftpcommand::ftpcommand::{Command, FtpCommand};
use crate::core_ftpcommand::{
    cdup, cwd, dele, list, mkd, noop, pass, pwd, quit, retr, rmd, rnfr, rnto, stor, user,
};
use crate::core_network::control::ControlChannel;
use crate::core_network::data_channel::{server_endpoint, PendingDataChannel};
use crate::core_network::error::DataChannelError;
use crate::core_network::transfer::await_done;
use crate::core_network::{pasv, port};
use crate::helpers::{send_response, send_result};
use crate::server::ServerContext;
use crate::session::Session;
use log::{error, info, warn};
use std::path::Path;
use std::sync::Arc;

/// Everything a command handler works with: the session state, the control
/// connection it came in on, and the server-wide settings.
pub struct SessionContext {
    pub session: Session,
    pub control: ControlChannel,
    pub server: Arc<ServerContext>,
}

impl SessionContext {
    pub fn new(session: Session, control: ControlChannel, server: Arc<ServerContext>) -> Self {
        Self {
            session,
            control,
            server,
        }
    }

    /// Sets up this side of the data connection for the negotiated mode.
    ///
    /// `None` means it could not be set up and the client has already been told so.
    pub async fn prepare_data_channel(&mut self) -> std::io::Result<Option<PendingDataChannel>> {
        let prepared = match server_endpoint(
            self.session.transfer_mode,
            self.control.local_addr(),
            self.control.peer_addr(),
        ) {
            Ok(endpoint) => PendingDataChannel::prepare(endpoint).await,
            Err(e) => Err(e),
        };

        match prepared {
            Ok(pending) => Ok(Some(pending)),
            Err(e) => {
                error!("Failed to set up data connection for {}: {}", self.control.peer_addr(), e);
                send_result(&mut self.control, Err(SessionError::DataConnection(e.to_string())))
                    .await?;
                Ok(None)
            }
        }
    }

    /// Waits for the client's DONE so the next command starts in step.
    pub async fn finish_transfer(&mut self) -> std::io::Result<()> {
        if !await_done(&mut self.control).await? {
            warn!("Control connection to {} closed before DONE", self.control.peer_addr());
        }
        Ok(())
    }
}

/// Logs how a transfer went. Failures end the transfer, never the session.
pub fn report_transfer(outcome: Result<u64, DataChannelError>, path: &Path) {
    match outcome {
        Ok(bytes) => info!("Transfer of {:?} complete: {} bytes", path, bytes),
        Err(e) => error!("Transfer of {:?} failed: {}", path, e),
    }
}

/// Whether the session loop keeps reading commands after this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Runs one parsed command to completion, transfers included.
///
/// An `Err` means the control connection failed; everything else, rejections
/// included, has already been answered on it.
pub async fn dispatch(ctx: &mut SessionContext, command: Command) -> std::io::Result<Flow> {
    let Command { op, arg } = command;

    // Unparseable input is ignored before any gate can answer it.
    if op == FtpCommand::NOOP {
        noop::handle_noop_command();
        return Ok(Flow::Continue);
    }

    if let Err(e) = ctx.session.check_gates(op) {
        warn!("{} refused: {}", op, e);
        send_result(&mut ctx.control, Err(e)).await?;
        return Ok(Flow::Continue);
    }

    match op {
        FtpCommand::USER => user::handle_user_command(ctx, &arg).await?,
        FtpCommand::PASS => pass::handle_pass_command(ctx, &arg).await?,
        FtpCommand::QUIT => {
            quit::handle_quit_command(ctx).await?;
            return Ok(Flow::Quit);
        }
        FtpCommand::PORT => port::handle_port_command(ctx, &arg).await?,
        FtpCommand::PASV => pasv::handle_pasv_command(ctx).await?,
        FtpCommand::RETR => retr::handle_retr_command(ctx, &arg).await?,
        FtpCommand::STOR => stor::handle_stor_command(ctx, &arg).await?,
        FtpCommand::LIST => list::handle_list_command(ctx).await?,
        FtpCommand::CWD => cwd::handle_cwd_command(ctx, &arg).await?,
        FtpCommand::CDUP => cdup::handle_cdup_command(ctx).await?,
        FtpCommand::PWD => pwd::handle_pwd_command(ctx).await?,
        FtpCommand::MKD => mkd::handle_mkd_command(ctx, &arg).await?,
        FtpCommand::RMD => rmd::handle_rmd_command(ctx, &arg).await?,
        FtpCommand::DELE => dele::handle_dele_command(ctx, &arg).await?,
        FtpCommand::RNFR => rnfr::handle_rnfr_command(ctx, &arg).await?,
        FtpCommand::RNTO => rnto::handle_rnto_command(ctx, &arg).await?,
        // HELP is answered by the client itself.
        FtpCommand::HELP => send_response(&mut ctx.control, "502 Command not implemented.").await?,
        FtpCommand::NOOP => noop::handle_noop_command(),
    }

    Ok(Flow::Continue)
}
