use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "simpleftp", about = "A small FTP client and server written in Rust.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "")]
    pub config: String,

    /// Enable verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Run the FTP server
    Server {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory sessions start in
        #[arg(long)]
        home: Option<PathBuf>,
    },
    /// Connect to an FTP server and run the interactive client
    Client {
        /// Host to connect to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to connect to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print a bcrypt hash usable as `password_hash` in the server configuration
    HashPassword {
        password: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_flags() {
        let cli = Cli::parse_from(["simpleftp", "-c", "ftp.toml", "server", "-p", "2121"]);
        assert_eq!(cli.config, "ftp.toml");
        match cli.mode {
            Mode::Server { port, home } => {
                assert_eq!(port, Some(2121));
                assert!(home.is_none());
            }
            other => panic!("unexpected mode: {:?}", other),
        }
    }

    #[test]
    fn test_client_flags() {
        let cli = Cli::parse_from(["simpleftp", "client", "-H", "ftp.example.org", "--verbose"]);
        assert!(cli.verbose);
        match cli.mode {
            Mode::Client { host, port } => {
                assert_eq!(host.as_deref(), Some("ftp.example.org"));
                assert!(port.is_none());
            }
            other => panic!("unexpected mode: {:?}", other),
        }
    }
}
