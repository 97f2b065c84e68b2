use crate::config::TransferConfig;
use crate::constants::SUCCESS_MARKER;
use crate::core_client::error::ClientError;
use crate::core_client::interactive::help_text;
use crate::core_ftpcommand::ftpcommand::{Command, FtpCommand};
use crate::core_network::control::ControlChannel;
use crate::core_network::data_channel::{client_endpoint, DataChannelSettings, PendingDataChannel};
use crate::core_network::port::resolve_port;
use crate::core_network::transfer::{receive_file, send_done, send_file, TransferOptions};
use crate::session::TransferMode;
use anyhow::{anyhow, Context};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::net::TcpStream;

/// Positive acknowledgements carry the success marker somewhere in the reply.
pub fn is_success(reply: &str) -> bool {
    reply.contains(SUCCESS_MARKER)
}

/// Client side of one control connection.
///
/// Mirrors the server's transfer mode, changing it only after the server
/// acknowledged PORT or PASV, and plays the opposite data-channel role for
/// RETR and STOR.
#[derive(Debug)]
pub struct FtpClient {
    control: ControlChannel,
    greeting: String,
    transfer_mode: TransferMode,
    local_dir: PathBuf,
    data_channel: DataChannelSettings,
    transfer: TransferOptions,
}

impl FtpClient {
    pub async fn connect(
        host: &str,
        port: u16,
        local_dir: PathBuf,
        config: &TransferConfig,
    ) -> anyhow::Result<Self> {
        let stream = TcpStream::connect((host, port))
            .await
            .with_context(|| format!("Failed to connect to {}:{}", host, port))?;
        let mut control = ControlChannel::new(stream).context("Failed to set up control connection")?;
        let greeting = control
            .receive_reply()
            .await
            .context("Failed to read the server greeting")?
            .ok_or_else(|| anyhow!("Server closed the connection before greeting"))?;
        info!("Connected to {}", control.peer_addr());

        Ok(Self {
            control,
            greeting,
            transfer_mode: TransferMode::default(),
            local_dir,
            data_channel: DataChannelSettings::from(config),
            transfer: TransferOptions {
                buffer_size: config.buffer_size,
                timeout: config.data_timeout(),
            },
        })
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn transfer_mode(&self) -> TransferMode {
        self.transfer_mode
    }

    /// Runs one parsed command and returns the server's reply text.
    ///
    /// HELP is answered locally and NOOP does nothing; neither reaches the server.
    pub async fn execute(&mut self, command: &Command) -> Result<String, ClientError> {
        match command.op {
            FtpCommand::PORT => self.port(&command.arg).await,
            FtpCommand::PASV => self.pasv().await,
            FtpCommand::RETR => self.retr(&command.arg).await,
            FtpCommand::STOR => self.stor(&command.arg).await,
            FtpCommand::QUIT => self.quit().await,
            FtpCommand::HELP => Ok(help_text().to_string()),
            FtpCommand::NOOP => Ok(String::new()),
            op => self.send_command(op, &command.arg).await,
        }
    }

    async fn send_command(&mut self, op: FtpCommand, arg: &str) -> Result<String, ClientError> {
        let command = Command::new(op, arg);
        self.control.send_message(&command.to_wire()).await?;
        let reply = self
            .control
            .receive_reply()
            .await?
            .ok_or(ClientError::ConnectionClosed)?;
        debug!("{} answered with: {}", op, reply);
        Ok(reply)
    }

    pub async fn port(&mut self, arg: &str) -> Result<String, ClientError> {
        let requested = resolve_port(arg, self.control.local_addr().port());
        let reply = self.send_command(FtpCommand::PORT, arg).await?;
        if is_success(&reply) {
            match requested {
                Ok(port) => {
                    self.transfer_mode = TransferMode::Active(port);
                    info!("Active mode, listening on port {} for transfers", port);
                }
                Err(e) => warn!("Server accepted PORT {:?} but it is not usable here: {}", arg, e),
            }
        }
        Ok(reply)
    }

    pub async fn pasv(&mut self) -> Result<String, ClientError> {
        let reply = self.send_command(FtpCommand::PASV, "").await?;
        if is_success(&reply) {
            self.transfer_mode = TransferMode::Passive;
        }
        Ok(reply)
    }

    /// Downloads `name` into the local directory, keeping only its file name.
    pub async fn retr(&mut self, name: &str) -> Result<String, ClientError> {
        let local_path = self.local_dir.join(file_name(name)?);
        let pending = self.prepare_data_channel().await?;

        let reply = self.send_command(FtpCommand::RETR, name).await?;
        if !is_success(&reply) {
            return Ok(reply);
        }

        let outcome = match pending.open(&self.data_channel).await {
            Ok(data) => receive_file(&mut self.control, data, &local_path, &self.transfer).await,
            Err(e) => Err(e),
        };
        send_done(&mut self.control).await?;

        let bytes = outcome?;
        info!("Downloaded {} ({} bytes) to {}", name, bytes, local_path.display());
        Ok(reply)
    }

    /// Uploads `path`, relative to the local directory, under its file name.
    pub async fn stor(&mut self, path: &str) -> Result<String, ClientError> {
        let local_path = self.local_dir.join(path);
        let size = match fs::metadata(&local_path).await {
            Ok(metadata) if metadata.is_file() => metadata.len(),
            _ => return Err(ClientError::LocalFileNotFound(local_path)),
        };
        let remote_name = file_name(path)?;
        let file = File::open(&local_path)
            .await
            .map_err(|source| ClientError::LocalFile {
                path: local_path.clone(),
                source,
            })?;
        let pending = self.prepare_data_channel().await?;

        let reply = self.send_command(FtpCommand::STOR, &remote_name).await?;
        if !is_success(&reply) {
            return Ok(reply);
        }

        let outcome = match pending.open(&self.data_channel).await {
            Ok(data) => send_file(&mut self.control, data, file, size, &self.transfer).await,
            Err(e) => Err(e),
        };
        send_done(&mut self.control).await?;

        let bytes = outcome?;
        info!("Uploaded {} ({} bytes)", local_path.display(), bytes);
        Ok(reply)
    }

    /// Says goodbye. The server closes the connection afterwards.
    pub async fn quit(&mut self) -> Result<String, ClientError> {
        self.control
            .send_message(FtpCommand::QUIT.as_str())
            .await?;
        Ok(self.control.receive_reply().await?.unwrap_or_default())
    }

    async fn prepare_data_channel(&self) -> Result<PendingDataChannel, ClientError> {
        let endpoint = client_endpoint(
            self.transfer_mode,
            self.control.local_addr(),
            self.control.peer_addr(),
        )?;
        Ok(PendingDataChannel::prepare(endpoint).await?)
    }
}

fn file_name(path: &str) -> Result<String, ClientError> {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ClientError::InvalidFileName(path.to_string()))
}
