use crate::core_network::error::DataChannelError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("connection closed by server")]
    ConnectionClosed,

    #[error("control connection failed: {0}")]
    Control(#[from] std::io::Error),

    #[error("local file not found: {}", .0.display())]
    LocalFileNotFound(PathBuf),

    #[error("cannot open local file {}: {source}", .path.display())]
    LocalFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no file name in {0:?}")]
    InvalidFileName(String),

    #[error("transfer failed: {0}")]
    Transfer(#[from] DataChannelError),
}

impl ClientError {
    /// Errors after which the control connection can't be used any more.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ClientError::ConnectionClosed | ClientError::Control(_))
    }
}
