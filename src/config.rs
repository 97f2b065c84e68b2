use crate::constants::{
    DEFAULT_BUFFER_SIZE, DEFAULT_CONNECT_ATTEMPTS, DEFAULT_CONTROL_PORT, DEFAULT_CREDENTIAL,
    DEFAULT_SETTLE_DELAY_MS, ENV_HOME, ENV_PASSWORD, ENV_USERNAME,
};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub listen_port: u16,
    pub home_dir: PathBuf,
    pub username: String,
    pub password: String,
    pub password_hash: Option<String>, // bcrypt, wins over `password` when set
    pub banner: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub local_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransferConfig {
    pub buffer_size: usize,
    pub settle_delay_ms: u64,
    pub connect_attempts: u32,
    pub data_timeout_secs: Option<u64>, // None keeps data sockets blocking forever
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub transfer: TransferConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from("0.0.0.0"),
            listen_port: DEFAULT_CONTROL_PORT,
            home_dir: PathBuf::from("."),
            username: String::from(DEFAULT_CREDENTIAL),
            password: String::from(DEFAULT_CREDENTIAL),
            password_hash: None,
            banner: None,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: String::from("localhost"),
            port: DEFAULT_CONTROL_PORT,
            local_dir: PathBuf::from("."),
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            data_timeout_secs: None,
        }
    }
}

impl TransferConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn data_timeout(&self) -> Option<Duration> {
        self.data_timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Loads the configuration from a TOML file, or the built-in defaults when no path is given.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) if !path.is_empty() => Self::load_from_file(path)?,
            _ => {
                debug!("No configuration file given, using defaults");
                Config::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))?;

        if config.transfer.buffer_size == 0 {
            config.transfer.buffer_size = DEFAULT_BUFFER_SIZE;
        }
        if config.transfer.connect_attempts == 0 {
            config.transfer.connect_attempts = 1;
        }

        info!("Configuration loaded from {}", path);
        Ok(config)
    }

    /// Credentials and home directory may come from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(username) = lookup(ENV_USERNAME) {
            self.server.username = username;
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.server.password = password;
            // An explicit password in the environment replaces a configured hash.
            self.server.password_hash = None;
        }
        if let Some(home) = lookup(ENV_HOME) {
            self.server.home_dir = PathBuf::from(home);
        }
    }
}

// Helper function to log configuration options
pub fn log_config(config: &Config) {
    info!("  Listen Address: {}", config.server.listen_address);
    info!("  Listen Port: {}", config.server.listen_port);
    info!("  Home Directory: {}", config.server.home_dir.display());
    info!("  Username: {}", config.server.username);
    info!("  Buffer Size: {} bytes", config.transfer.buffer_size);
    info!("  Settle Delay: {} ms", config.transfer.settle_delay_ms);
    match config.transfer.data_timeout_secs {
        Some(secs) => info!("  Data Timeout: {} s", secs),
        None => info!("  Data Timeout: none"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.listen_port, 21);
        assert_eq!(config.server.username, "anonymous");
        assert_eq!(config.server.password, "anonymous");
        assert_eq!(config.transfer.settle_delay(), Duration::from_millis(500));
        assert!(config.transfer.data_timeout().is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nlisten_port = 2121\nusername = \"alice\"\n").unwrap();
        writeln!(file, "[transfer]\ndata_timeout_secs = 30").unwrap();

        let config = Config::load_from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.listen_port, 2121);
        assert_eq!(config.server.username, "alice");
        assert_eq!(config.server.password, "anonymous");
        assert_eq!(config.client.port, 21);
        assert_eq!(config.transfer.data_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server\nlisten_port = ").unwrap();
        assert!(Config::load_from_file(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_USERNAME, "bob"),
            (ENV_PASSWORD, "secret"),
            (ENV_HOME, "/tmp"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.server.password_hash = Some("$2b$04$abc".to_string());
        config.apply_overrides_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.username, "bob");
        assert_eq!(config.server.password, "secret");
        assert!(config.server.password_hash.is_none());
        assert_eq!(config.server.home_dir, PathBuf::from("/tmp"));
    }
}
