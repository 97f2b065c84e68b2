use crate::config::{log_config, Config};
use crate::core_auth::Credentials;
use crate::core_network::data_channel::DataChannelSettings;
use crate::core_network::network::FtpServer;
use crate::core_network::transfer::TransferOptions;
use crate::helpers::load_banner;
use anyhow::{bail, Context, Result};
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Read-only state shared by every session of one server.
#[derive(Debug)]
pub struct ServerContext {
    pub home: PathBuf,
    pub credentials: Credentials,
    pub banner: Option<String>,
    pub data_channel: DataChannelSettings,
    pub transfer: TransferOptions,
}

impl ServerContext {
    /// Resolves the home directory and loads the banner; both are startup errors when invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        let home = config.server.home_dir.canonicalize().with_context(|| {
            format!(
                "Failed to resolve home directory: {}",
                config.server.home_dir.display()
            )
        })?;
        if !home.is_dir() {
            bail!("Home directory is not a directory: {}", home.display());
        }

        let banner = match &config.server.banner {
            Some(path) => Some(load_banner(path)?),
            None => None,
        };

        Ok(Self {
            home,
            credentials: Credentials::from_config(&config.server),
            banner,
            data_channel: DataChannelSettings::from(&config.transfer),
            transfer: TransferOptions {
                buffer_size: config.transfer.buffer_size,
                timeout: config.transfer.data_timeout(),
            },
        })
    }
}

/// Runs the FTP server with the provided configuration until `token` is cancelled.
pub async fn run(config: Config, token: CancellationToken) -> Result<()> {
    info!("Starting server with config:");
    log_config(&config);

    let context = Arc::new(ServerContext::from_config(&config)?);
    info!("Sessions start in {}", context.home.display());

    let addr = format!("{}:{}", config.server.listen_address, config.server.listen_port);
    let server = match FtpServer::bind(&addr, context).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start server: {:#}", e);
            return Err(e);
        }
    };

    server.run(token).await
}
