use crate::core_ftpcommand::error::SessionError;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use std::path::PathBuf;

/// How the data connection for the next transfer gets opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransferMode {
    /// The client listens on this port, the server connects to it.
    Active(u16),
    /// The server listens next to its control port, the client connects.
    /// Default, since it works for clients behind NAT.
    #[default]
    Passive,
}

/// Per-connection server state, owned by the task serving that connection.
#[derive(Debug)]
pub struct Session {
    pub current_dir: PathBuf,
    pub rename_from: Option<PathBuf>,
    pub transfer_mode: TransferMode,
    pub username_accepted: bool,
    pub is_authenticated: bool,
}

impl Session {
    /// `home` must be an absolute, existing directory.
    pub fn new(home: PathBuf) -> Self {
        Self {
            current_dir: home,
            rename_from: None,
            transfer_mode: TransferMode::default(),
            username_accepted: false,
            is_authenticated: false,
        }
    }

    /// Checks the ordering gates that apply before any handler runs.
    ///
    /// A pending rename blocks everything but RNTO (QUIT still ends the session),
    /// then filesystem and transfer commands need a completed login.
    pub fn check_gates(&self, op: FtpCommand) -> Result<(), SessionError> {
        if self.rename_from.is_some() && !matches!(op, FtpCommand::RNTO | FtpCommand::QUIT) {
            return Err(SessionError::RenameNotCompleted);
        }
        if op.requires_auth() && !self.is_authenticated {
            return Err(SessionError::NotLoggedIn);
        }
        Ok(())
    }

    pub fn accept_username(&mut self) {
        self.username_accepted = true;
    }

    pub fn authenticate(&mut self) {
        debug_assert!(self.username_accepted);
        self.is_authenticated = true;
    }
}
