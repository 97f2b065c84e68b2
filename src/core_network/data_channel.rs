use crate::config::TransferConfig;
use crate::constants::PASV_PORT_OFFSET;
use crate::core_network::error::DataChannelError;
use crate::session::TransferMode;
use log::{debug, info, warn};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

/// Knobs shared by both peers when opening a data connection.
#[derive(Debug, Clone, Copy)]
pub struct DataChannelSettings {
    pub settle_delay: Duration,
    pub connect_attempts: u32,
    pub timeout: Option<Duration>,
}

impl From<&TransferConfig> for DataChannelSettings {
    fn from(config: &TransferConfig) -> Self {
        Self {
            settle_delay: config.settle_delay(),
            connect_attempts: config.connect_attempts.max(1),
            timeout: config.data_timeout(),
        }
    }
}

/// Which side of the data connection this peer plays for one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataEndpoint {
    Listen(SocketAddr),
    Connect(SocketAddr),
}

/// The passive data address: same host as the server's control socket, port + 1.
pub fn passive_addr(server_control: SocketAddr) -> Result<SocketAddr, DataChannelError> {
    let port = server_control
        .port()
        .checked_add(PASV_PORT_OFFSET)
        .ok_or(DataChannelError::NoPassivePort(server_control.port()))?;
    Ok(SocketAddr::new(server_control.ip(), port))
}

/// Server role: passive listens next to its own control port, active dials the client back.
pub fn server_endpoint(
    mode: TransferMode,
    control_local: SocketAddr,
    control_peer: SocketAddr,
) -> Result<DataEndpoint, DataChannelError> {
    match mode {
        TransferMode::Passive => Ok(DataEndpoint::Listen(passive_addr(control_local)?)),
        TransferMode::Active(port) => Ok(DataEndpoint::Connect(SocketAddr::new(
            control_peer.ip(),
            port,
        ))),
    }
}

/// Client role, the mirror image of [`server_endpoint`].
pub fn client_endpoint(
    mode: TransferMode,
    control_local: SocketAddr,
    control_peer: SocketAddr,
) -> Result<DataEndpoint, DataChannelError> {
    match mode {
        TransferMode::Passive => Ok(DataEndpoint::Connect(passive_addr(control_peer)?)),
        TransferMode::Active(port) => Ok(DataEndpoint::Listen(SocketAddr::new(
            control_local.ip(),
            port,
        ))),
    }
}

/// A data connection that has been set up but not opened yet.
///
/// Listening sockets are bound here so that bind failures surface before the
/// peer is told to go ahead.
#[derive(Debug)]
pub enum PendingDataChannel {
    Listening(TcpListener),
    Connecting(SocketAddr),
}

impl PendingDataChannel {
    pub async fn prepare(endpoint: DataEndpoint) -> Result<Self, DataChannelError> {
        match endpoint {
            DataEndpoint::Listen(addr) => {
                let listener = TcpListener::bind(addr)
                    .await
                    .map_err(|source| DataChannelError::Bind { addr, source })?;
                debug!("Data listener bound on {}", addr);
                Ok(PendingDataChannel::Listening(listener))
            }
            DataEndpoint::Connect(addr) => Ok(PendingDataChannel::Connecting(addr)),
        }
    }

    /// Opens exactly one data connection. The listening socket, if any, is closed on return.
    pub async fn open(self, settings: &DataChannelSettings) -> Result<TcpStream, DataChannelError> {
        match self {
            PendingDataChannel::Listening(listener) => accept_one(listener, settings).await,
            PendingDataChannel::Connecting(addr) => connect_after_settle(addr, settings).await,
        }
    }
}

async fn accept_one(
    listener: TcpListener,
    settings: &DataChannelSettings,
) -> Result<TcpStream, DataChannelError> {
    let addr = listener.local_addr()?;

    let (stream, peer) = bounded(settings.timeout, "accepting a data connection", async {
        listener
            .accept()
            .await
            .map_err(|source| DataChannelError::Accept { addr, source })
    })
    .await?;

    info!("Accepted data connection from {} on {}", peer, addr);
    Ok(stream)
}

/// The listening peer needs a moment to get ready; there is no handshake, so wait
/// the settle delay and retry a bounded number of times.
async fn connect_after_settle(
    addr: SocketAddr,
    settings: &DataChannelSettings,
) -> Result<TcpStream, DataChannelError> {
    let attempts = settings.connect_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        tokio::time::sleep(settings.settle_delay).await;

        let result = bounded(settings.timeout, "connecting the data channel", async {
            TcpStream::connect(addr).await.map_err(DataChannelError::from)
        })
        .await;

        match result {
            Ok(stream) => {
                info!("Established data connection to {}", addr);
                return Ok(stream);
            }
            Err(DataChannelError::Io(source)) if attempt >= attempts => {
                return Err(DataChannelError::Connect {
                    addr,
                    attempts,
                    source,
                });
            }
            Err(DataChannelError::Io(e)) => {
                warn!(
                    "Data connection to {} failed (attempt {}/{}): {}",
                    addr, attempt, attempts, e
                );
            }
            Err(other) => return Err(other),
        }
    }
}

/// Runs `fut`, giving up after `limit` when one is configured.
pub(crate) async fn bounded<T, F>(
    limit: Option<Duration>,
    what: &'static str,
    fut: F,
) -> Result<T, DataChannelError>
where
    F: Future<Output = Result<T, DataChannelError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| DataChannelError::Timeout(what))?,
        None => fut.await,
    }
}
