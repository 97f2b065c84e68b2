use crate::constants::MAX_MESSAGE_SIZE;
use log::{debug, trace};
use std::borrow::Cow;
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// Line-oriented control connection.
///
/// Owns both halves of the socket and one receive buffer that is reused for
/// every message read on this connection.
#[derive(Debug)]
pub struct ControlChannel {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    buffer: Vec<u8>,
    local_addr: SocketAddr,
    peer_addr: SocketAddr,
}

impl ControlChannel {
    pub fn new(stream: TcpStream) -> std::io::Result<Self> {
        let local_addr = stream.local_addr()?;
        let peer_addr = stream.peer_addr()?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
            buffer: Vec::with_capacity(MAX_MESSAGE_SIZE),
            local_addr,
            peer_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Sends one message, terminated by CRLF.
    pub async fn send_message(&mut self, message: &str) -> std::io::Result<()> {
        debug!("-> {}: {}", self.peer_addr, loggable(message));
        let mut line = String::with_capacity(message.len() + 2);
        line.push_str(message.trim_end_matches(['\r', '\n']));
        line.push_str("\r\n");
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await
    }

    /// Sends a reply whose text may span several lines, using `ddd-` continuation lines.
    pub async fn send_multiline(&mut self, code: u16, lines: &[String]) -> std::io::Result<()> {
        let Some((last, rest)) = lines.split_last() else {
            return self.send_message(&format!("{}", code)).await;
        };
        let mut reply = String::new();
        for line in rest {
            reply.push_str(&format!("{}-{}\r\n", code, line));
        }
        reply.push_str(&format!("{} {}\r\n", code, last));

        debug!("-> {}: {} line(s) with code {}", self.peer_addr, lines.len(), code);
        self.writer.write_all(reply.as_bytes()).await?;
        self.writer.flush().await
    }

    /// Reads one message without its line terminator. `None` means the peer closed the connection.
    ///
    /// At most [`MAX_MESSAGE_SIZE`] bytes are consumed per call; the rest of an
    /// overlong line is returned by the next call.
    pub async fn receive_message(&mut self) -> std::io::Result<Option<String>> {
        self.read_line(Some(MAX_MESSAGE_SIZE)).await
    }

    async fn read_line(&mut self, limit: Option<usize>) -> std::io::Result<Option<String>> {
        self.buffer.clear();
        let n = match limit {
            Some(limit) => {
                (&mut self.reader)
                    .take(limit as u64)
                    .read_until(b'\n', &mut self.buffer)
                    .await?
            }
            None => self.reader.read_until(b'\n', &mut self.buffer).await?,
        };
        if n == 0 {
            return Ok(None);
        }

        let message = String::from_utf8_lossy(&self.buffer)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        trace!("<- {}: {}", self.peer_addr, loggable(&message));
        Ok(Some(message))
    }

    /// Reads a complete reply, following `ddd-` continuation lines up to the closing `ddd ` line.
    /// Lines are joined with `\n`.
    ///
    /// Reply lines are read whole: a path in a reply may be longer than any command.
    pub async fn receive_reply(&mut self) -> std::io::Result<Option<String>> {
        let Some(first) = self.read_line(None).await? else {
            return Ok(None);
        };

        let Some(code) = continuation_code(&first) else {
            return Ok(Some(first));
        };

        let mut reply = first;
        loop {
            let Some(line) = self.read_line(None).await? else {
                // Peer went away mid-reply; hand back what arrived.
                return Ok(Some(reply));
            };
            reply.push('\n');
            reply.push_str(&line);
            if is_closing_line(&line, &code) {
                return Ok(Some(reply));
            }
        }
    }
}

/// The message as it may appear in logs: PASS arguments are masked.
pub fn loggable(message: &str) -> Cow<'_, str> {
    match message.split_once(' ') {
        Some((verb, _)) if verb.eq_ignore_ascii_case("pass") => Cow::Owned(format!("{} ****", verb)),
        _ => Cow::Borrowed(message),
    }
}

/// `Some("ddd")` when the line opens a multi-line reply (`ddd-...`).
fn continuation_code(line: &str) -> Option<String> {
    let bytes = line.as_bytes();
    if bytes.len() >= 4 && bytes[..3].iter().all(u8::is_ascii_digit) && bytes[3] == b'-' {
        Some(line[..3].to_string())
    } else {
        None
    }
}

fn is_closing_line(line: &str, code: &str) -> bool {
    line.len() >= 3 && line.starts_with(code) && !line[3..].starts_with('-')
}
