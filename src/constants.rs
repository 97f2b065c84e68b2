// src/constants.rs

/// Largest control message read in one go. Longer lines arrive as several messages.
pub const MAX_MESSAGE_SIZE: usize = 1024;

/// Completion sentinel exchanged on the control channel after every RETR/STOR.
pub const DONE_SENTINEL: &str = "DONE";

/// Replies carrying this token are treated as a positive acknowledgement by the client.
pub const SUCCESS_MARKER: &str = "200";

/// The passive data listener sits this many ports above the control port.
pub const PASV_PORT_OFFSET: u16 = 1;

/// Lowest port accepted by PORT when the default (peer port + 1) is used.
pub const MIN_DEFAULT_DATA_PORT: u16 = 1023;
/// Lowest port accepted by PORT when the client names one explicitly.
pub const MIN_EXPLICIT_DATA_PORT: u16 = 1024;

pub const ENV_USERNAME: &str = "FTP_USERNAME";
pub const ENV_PASSWORD: &str = "FTP_PASSWORD";
pub const ENV_HOME: &str = "FTP_HOME";

pub const DEFAULT_CREDENTIAL: &str = "anonymous";
pub const DEFAULT_CONTROL_PORT: u16 = 21;
pub const DEFAULT_BUFFER_SIZE: usize = 1024;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 500;
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 5;

pub const CLIENT_PROMPT: &str = "ftp> ";
