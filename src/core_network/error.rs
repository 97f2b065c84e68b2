// Failures of the data connection and of the transfer running over it.
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataChannelError {
    #[error("failed to listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("failed to accept data connection on {addr}: {source}")]
    Accept {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("failed to connect to {addr} after {attempts} attempt(s): {source}")]
    Connect {
        addr: SocketAddr,
        attempts: u32,
        source: std::io::Error,
    },

    #[error("no data port available above control port {0}")]
    NoPassivePort(u16),

    #[error("timed out while {0}")]
    Timeout(&'static str),

    #[error("invalid size header: {0:?}")]
    InvalidSizeHeader(String),

    #[error("control connection closed before the size header arrived")]
    MissingSizeHeader,

    #[error("transfer ended after {received} of {expected} bytes")]
    ShortTransfer { expected: u64, received: u64 },

    #[error("I/O error during transfer: {0}")]
    Io(#[from] std::io::Error),
}
