mod config;
mod constants;
mod core_auth;
mod core_cli;
mod core_client;
mod core_ftpcommand;
mod core_log;
mod core_network;
mod helpers;
mod server;
mod session;

use crate::config::Config;
use crate::core_auth::helper::hash_password;
use crate::core_cli::{Cli, Mode};
use crate::core_log::logger::init_logger;
use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    init_logger(args.verbose);

    // Load configuration from the TOML file, or the defaults
    let config_path = if args.config.is_empty() {
        None
    } else {
        Some(args.config.as_str())
    };
    let mut config = Config::load(config_path)?;

    match args.mode {
        Mode::Server { port, home } => {
            // Command line wins over file and environment
            if let Some(port) = port {
                config.server.listen_port = port;
            }
            if let Some(home) = home {
                config.server.home_dir = home;
            }

            let token = CancellationToken::new();
            shutdown_on_ctrl_c(token.clone());
            server::run(config, token).await
        }
        Mode::Client { host, port } => {
            if let Some(host) = host {
                config.client.host = host;
            }
            if let Some(port) = port {
                config.client.port = port;
            }
            core_client::run(&config).await
        }
        Mode::HashPassword { password } => {
            let hash = hash_password(&password).context("Failed to hash password")?;
            println!("{}", hash);
            Ok(())
        }
    }
}

fn shutdown_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, shutting down");
                token.cancel();
            }
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    });
}
