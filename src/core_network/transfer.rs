use crate::constants::DONE_SENTINEL;
use crate::core_network::control::ControlChannel;
use crate::core_network::data_channel::bounded;
use crate::core_network::error::DataChannelError;
use log::{debug, info, warn};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Per-transfer I/O settings.
#[derive(Debug, Clone, Copy)]
pub struct TransferOptions {
    pub buffer_size: usize,
    pub timeout: Option<Duration>,
}

/// Sender half of the file transfer.
///
/// `size` must come from the file's metadata, taken before the data connection
/// was opened. The size header goes out on the control channel, the bytes on
/// the data connection, which is shut down afterwards.
pub async fn send_file(
    control: &mut ControlChannel,
    mut data: TcpStream,
    mut file: File,
    size: u64,
    options: &TransferOptions,
) -> Result<u64, DataChannelError> {
    control.send_message(&size.to_string()).await?;
    debug!("Sent size header: {} bytes", size);

    let mut buffer = vec![0u8; options.buffer_size.max(1)];
    let mut remaining = size;
    while remaining > 0 {
        let want = (buffer.len() as u64).min(remaining) as usize;
        let read = file.read(&mut buffer[..want]).await?;
        if read == 0 {
            // The file shrank underneath us.
            return Err(DataChannelError::ShortTransfer {
                expected: size,
                received: size - remaining,
            });
        }

        let mut written = 0;
        while written < read {
            let chunk = &buffer[written..read];
            let n = bounded(options.timeout, "writing to the data channel", async {
                data.write(chunk).await.map_err(DataChannelError::from)
            })
            .await?;
            if n == 0 {
                return Err(DataChannelError::ShortTransfer {
                    expected: size,
                    received: size - remaining + written as u64,
                });
            }
            written += n;
        }
        remaining -= read as u64;
    }

    data.shutdown().await?;
    info!("Sent {} bytes over the data channel", size);
    Ok(size)
}

/// Receiver half of the file transfer: size header from the control channel
/// first, then exactly that many bytes from the data connection into `destination`.
///
/// An early end of the data stream is an error; whatever was written stays on disk.
pub async fn receive_file(
    control: &mut ControlChannel,
    mut data: TcpStream,
    destination: &Path,
    options: &TransferOptions,
) -> Result<u64, DataChannelError> {
    let header = bounded(options.timeout, "waiting for the size header", async {
        control.receive_message().await.map_err(DataChannelError::from)
    })
    .await?
    .ok_or(DataChannelError::MissingSizeHeader)?;
    let size = parse_size_header(&header)?;
    debug!("File size to receive: {} bytes", size);

    let mut file = File::create(destination).await?;
    let mut buffer = vec![0u8; options.buffer_size.max(1)];
    let mut remaining = size;
    while remaining > 0 {
        let want = (buffer.len() as u64).min(remaining) as usize;
        let read = bounded(options.timeout, "reading from the data channel", async {
            data.read(&mut buffer[..want]).await.map_err(DataChannelError::from)
        })
        .await?;
        if read == 0 {
            file.flush().await?;
            return Err(DataChannelError::ShortTransfer {
                expected: size,
                received: size - remaining,
            });
        }
        file.write_all(&buffer[..read]).await?;
        remaining -= read as u64;
    }
    file.flush().await?;

    info!("Received {} bytes into {:?}", size, destination);
    Ok(size)
}

pub fn parse_size_header(header: &str) -> Result<u64, DataChannelError> {
    header
        .trim()
        .parse::<u64>()
        .map_err(|_| DataChannelError::InvalidSizeHeader(header.to_string()))
}

pub async fn send_done(control: &mut ControlChannel) -> std::io::Result<()> {
    control.send_message(DONE_SENTINEL).await
}

/// Waits for the peer's `DONE`. Returns `false` when the control connection closed instead.
pub async fn await_done(control: &mut ControlChannel) -> std::io::Result<bool> {
    match control.receive_message().await? {
        Some(message) if message.trim() == DONE_SENTINEL => {
            debug!("Transfer acknowledged by peer");
            Ok(true)
        }
        Some(other) => {
            warn!("Expected {} after transfer, got {:?}; dropping it", DONE_SENTINEL, other);
            Ok(true)
        }
        None => Ok(false),
    }
}
