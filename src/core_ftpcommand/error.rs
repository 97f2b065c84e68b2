// Reply families a session sends back instead of failing.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("not logged in")]
    NotLoggedIn,

    #[error("invalid username")]
    InvalidUsername,

    #[error("invalid password")]
    InvalidPassword,

    #[error("already logged in")]
    AlreadyLoggedIn,

    #[error("username already provided")]
    UsernameAlreadyProvided,

    #[error("rename not completed")]
    RenameNotCompleted,

    #[error("no file to rename")]
    NoFileToRename,

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("directory already exists: {0}")]
    DirectoryAlreadyExists(String),

    #[error("target already exists: {0}")]
    TargetAlreadyExists(String),

    #[error("directory not empty: {0}")]
    DirectoryNotEmpty(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("not a regular file: {0}")]
    NotAFile(String),

    #[error("neither a regular file nor a directory: {0}")]
    NotAFileOrDirectory(String),

    #[error("current directory no longer exists")]
    CurrentDirectoryGone,

    #[error("failed to {action}: {reason}")]
    OperationFailed { action: &'static str, reason: String },

    #[error("can't open data connection: {0}")]
    DataConnection(String),
}

impl SessionError {
    pub fn to_ftp_response(&self) -> String {
        match self {
            SessionError::NotLoggedIn => "530 Not logged in.".to_string(),
            SessionError::InvalidUsername => "530 Invalid username.".to_string(),
            SessionError::InvalidPassword => "530 Invalid password.".to_string(),
            SessionError::AlreadyLoggedIn => "230 Already logged in.".to_string(),
            SessionError::UsernameAlreadyProvided => "503 Username already provided.".to_string(),
            SessionError::RenameNotCompleted => "503 Rename not completed, send RNTO.".to_string(),
            SessionError::NoFileToRename => "503 No file to rename, send RNFR first.".to_string(),
            SessionError::InvalidPort(_) => "501 Invalid port.".to_string(),
            SessionError::InvalidName(_) => "550 Invalid name.".to_string(),
            SessionError::FileNotFound(_) => "550 File not found.".to_string(),
            SessionError::DirectoryNotFound(_) => "550 Directory not found.".to_string(),
            SessionError::DirectoryAlreadyExists(_) => "550 Directory already exists.".to_string(),
            SessionError::TargetAlreadyExists(_) => "550 Target already exists.".to_string(),
            SessionError::DirectoryNotEmpty(_) => "550 Directory not empty.".to_string(),
            SessionError::NotADirectory(_) => "550 Path is not a directory.".to_string(),
            SessionError::NotAFile(_) => "550 Path is not a regular file.".to_string(),
            SessionError::NotAFileOrDirectory(_) => {
                "550 Path is not a regular file or directory.".to_string()
            }
            SessionError::CurrentDirectoryGone => {
                "550 Current directory no longer exists.".to_string()
            }
            SessionError::OperationFailed { action, .. } => format!("550 Failed to {}.", action),
            SessionError::DataConnection(_) => "425 Can't open data connection.".to_string(),
        }
    }
}
