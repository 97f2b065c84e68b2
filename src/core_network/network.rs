use crate::core_ftpcommand::ftpcommand::parse_command;
use crate::core_ftpcommand::handlers::{dispatch, Flow, SessionContext};
use crate::core_network::control::ControlChannel;
use crate::helpers::send_response;
use crate::server::ServerContext;
use crate::session::Session;
use anyhow::{Context, Result};
use log::{debug, error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// The listening side of the server: accepts control connections and runs one
/// session task per connection.
pub struct FtpServer {
    listener: TcpListener,
    context: Arc<ServerContext>,
}

impl FtpServer {
    pub async fn bind(addr: &str, context: Arc<ServerContext>) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to listen on {}", addr))?;
        Ok(Self { listener, context })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `token` is cancelled, then waits for the
    /// running sessions to wind down.
    pub async fn run(self, token: CancellationToken) -> Result<()> {
        info!("Server listening on {}", self.local_addr()?);
        let mut sessions = JoinSet::new();

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((socket, addr)) => {
                        info!("New connection from {}", addr);
                        let context = Arc::clone(&self.context);
                        let token = token.clone();
                        sessions.spawn(async move {
                            if let Err(e) = handle_connection(socket, context, token).await {
                                error!("Connection error with {}: {}", addr, e);
                            }
                            info!("Connection closed for {}", addr);
                        });
                    }
                    Err(e) => error!("Failed to accept connection: {}", e),
                },
                Some(finished) = sessions.join_next(), if !sessions.is_empty() => {
                    if let Err(e) = finished {
                        error!("Session task failed: {}", e);
                    }
                }
            }
        }

        drop(self.listener);
        info!("Listener closed, waiting for {} session(s)", sessions.len());
        while let Some(finished) = sessions.join_next().await {
            if let Err(e) = finished {
                error!("Session task failed: {}", e);
            }
        }
        info!("Server stopped");
        Ok(())
    }
}

/// Runs one session until QUIT, disconnect, a control channel failure or shutdown.
pub async fn handle_connection(
    socket: TcpStream,
    context: Arc<ServerContext>,
    token: CancellationToken,
) -> std::io::Result<()> {
    let control = ControlChannel::new(socket)?;
    let peer = control.peer_addr();
    let session = Session::new(context.home.clone());
    let mut ctx = SessionContext::new(session, control, context);

    send_response(&mut ctx.control, "220 Service ready.").await?;

    loop {
        let message = tokio::select! {
            _ = token.cancelled() => {
                info!("Shutdown requested, closing session with {}", peer);
                break;
            }
            message = ctx.control.receive_message() => message?,
        };

        let Some(line) = message else {
            info!("Client {} disconnected", peer);
            break;
        };

        let command = parse_command(&line);
        let op = command.op;
        debug!("Received {} from {}", op, peer);
        // A command may block on its data connection; shutdown abandons it.
        let flow = tokio::select! {
            _ = token.cancelled() => {
                info!("Shutdown requested, abandoning {} for {}", op, peer);
                break;
            }
            flow = dispatch(&mut ctx, command) => flow?,
        };
        if let Flow::Quit = flow {
            break;
        }
    }
    Ok(())
}
