use log::trace;
use std::fmt;

/// The reduced command set both peers understand.
///
/// `NOOP` is what the parser produces for anything it does not recognise. It is
/// never put on the wire.
#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    USER,
    PASS,
    QUIT,
    PORT,
    PASV,
    RETR,
    STOR,
    LIST,
    CWD,
    CDUP,
    PWD,
    MKD,
    RMD,
    DELE,
    RNFR,
    RNTO,
    HELP,
    NOOP,
}

impl FtpCommand {
    /// The verb sent on the control channel.
    pub fn as_str(&self) -> &'static str {
        match self {
            FtpCommand::USER => "USER",
            FtpCommand::PASS => "PASS",
            FtpCommand::QUIT => "QUIT",
            FtpCommand::PORT => "PORT",
            FtpCommand::PASV => "PASV",
            FtpCommand::RETR => "RETR",
            FtpCommand::STOR => "STOR",
            FtpCommand::LIST => "LIST",
            FtpCommand::CWD => "CWD",
            FtpCommand::CDUP => "CDUP",
            FtpCommand::PWD => "PWD",
            FtpCommand::MKD => "MKD",
            FtpCommand::RMD => "RMD",
            FtpCommand::DELE => "DELE",
            FtpCommand::RNFR => "RNFR",
            FtpCommand::RNTO => "RNTO",
            FtpCommand::HELP => "HELP",
            FtpCommand::NOOP => "NOOP",
        }
    }

    /// Commands that touch the filesystem or the data channel.
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            FtpCommand::LIST
                | FtpCommand::CWD
                | FtpCommand::CDUP
                | FtpCommand::PWD
                | FtpCommand::MKD
                | FtpCommand::RMD
                | FtpCommand::DELE
                | FtpCommand::RNFR
                | FtpCommand::RNTO
                | FtpCommand::PORT
                | FtpCommand::PASV
                | FtpCommand::RETR
                | FtpCommand::STOR
        )
    }
}

impl fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed line: the operation and its (possibly empty) argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub op: FtpCommand,
    pub arg: String,
}

impl Command {
    pub fn new(op: FtpCommand, arg: &str) -> Self {
        Self {
            op,
            arg: arg.to_string(),
        }
    }

    fn noop() -> Self {
        Self::new(FtpCommand::NOOP, "")
    }

    /// `VERB` or `VERB argument`, as sent on the control channel.
    pub fn to_wire(&self) -> String {
        if self.arg.is_empty() {
            self.op.as_str().to_string()
        } else {
            format!("{} {}", self.op, self.arg)
        }
    }
}

/// Turns one line of input into a [`Command`].
///
/// The verb is matched case-insensitively, the argument keeps its case. Every
/// verb requires an exact token count; anything else, including an empty line,
/// comes back as `NOOP`.
pub fn parse_command(line: &str) -> Command {
    let tokens: Vec<&str> = line.trim().split(' ').filter(|t| !t.is_empty()).collect();

    let Some(first) = tokens.first() else {
        return Command::noop();
    };
    let verb = first.to_lowercase();
    trace!("Parsed tokens: {:?}", tokens);

    match (verb.as_str(), &tokens[1..]) {
        ("user", [name]) => Command::new(FtpCommand::USER, name),
        ("pass", [password]) => Command::new(FtpCommand::PASS, password),
        ("quit", []) => Command::new(FtpCommand::QUIT, ""),
        ("port", []) => Command::new(FtpCommand::PORT, ""),
        ("port", [port]) => Command::new(FtpCommand::PORT, port),
        ("pasv", []) => Command::new(FtpCommand::PASV, ""),
        ("retr" | "get", [file]) => Command::new(FtpCommand::RETR, file),
        ("stor" | "put", [file]) => Command::new(FtpCommand::STOR, file),
        ("list" | "ls" | "dir", []) => Command::new(FtpCommand::LIST, ""),
        ("cwd" | "cd", [dir]) => Command::new(FtpCommand::CWD, dir),
        ("cdup" | "cd..", []) => Command::new(FtpCommand::CDUP, ""),
        ("pwd", []) => Command::new(FtpCommand::PWD, ""),
        ("mkd" | "mkdir", [dir]) => Command::new(FtpCommand::MKD, dir),
        ("rmd" | "rmdir", [dir]) => Command::new(FtpCommand::RMD, dir),
        ("dele" | "rm", [file]) => Command::new(FtpCommand::DELE, file),
        ("rnfr", [old]) => Command::new(FtpCommand::RNFR, old),
        ("rnto", [new]) => Command::new(FtpCommand::RNTO, new),
        ("help" | "?", []) => Command::new(FtpCommand::HELP, ""),
        _ => Command::noop(),
    }
}
