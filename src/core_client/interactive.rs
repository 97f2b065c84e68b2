use crate::config::Config;
use crate::constants::CLIENT_PROMPT;
use crate::core_client::client::FtpClient;
use crate::core_ftpcommand::ftpcommand::{parse_command, FtpCommand};
use anyhow::{Context, Result};
use colored::*;
use log::info;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP_TEXT: &str = "\
Available commands:
USER <name>           Send the user name
PASS <password>       Send the password
PORT [port]           Active mode; the server connects back to [port] (default: control port + 1)
PASV                  Passive mode; connect to the server for transfers
GET|RETR <file>       Download <file> into the local directory
PUT|STOR <file>       Upload a local <file>
LS|DIR|LIST           List the current remote directory
CD|CWD <dir>          Change the remote directory
CDUP|CD..             Go to the parent remote directory
PWD                   Print the remote directory
MKDIR|MKD <dir>       Create a remote directory
RMDIR|RMD <dir>       Remove an empty remote directory
RM|DELE <file>        Delete a remote file
RNFR <old>            Select a remote file to rename
RNTO <new>            Rename the selected file
HELP|?                Print this help
QUIT                  Disconnect";

pub fn help_text() -> &'static str {
    HELP_TEXT
}

/// Highlights directory lines of a LIST reply.
pub fn colorize_listing(reply: &str) -> String {
    reply
        .lines()
        .map(|line| {
            if line.ends_with('/') {
                line.blue().bold().to_string()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Connects with the client settings and runs the read-eval loop on stdin.
pub async fn run(config: &Config) -> Result<()> {
    let mut client = FtpClient::connect(
        &config.client.host,
        config.client.port,
        config.client.local_dir.clone(),
        &config.transfer,
    )
    .await?;
    println!("{}", client.greeting());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", CLIENT_PROMPT);
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            // End of input behaves like QUIT.
            println!();
            let reply = client.quit().await?;
            println!("{}", reply);
            break;
        };

        let command = parse_command(&line);
        if command.op == FtpCommand::NOOP {
            continue;
        }

        match client.execute(&command).await {
            Ok(reply) if command.op == FtpCommand::LIST => println!("{}", colorize_listing(&reply)),
            Ok(reply) => println!("{}", reply),
            Err(e) if e.is_fatal() => return Err(e).context("Lost the control connection"),
            Err(e) => eprintln!("{}", e.to_string().red()),
        }

        if command.op == FtpCommand::QUIT {
            break;
        }
    }

    info!("Disconnected");
    Ok(())
}
