// End-to-end sessions: a real listener on 127.0.0.1 driven by the client.
use crate::config::{Config, TransferConfig};
use crate::core_client::FtpClient;
use crate::core_client::error::ClientError;
use crate::core_ftpcommand::ftpcommand::parse_command;
use crate::core_network::control::ControlChannel;
use crate::core_network::network::FtpServer;
use crate::server::ServerContext;
use crate::session::TransferMode;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct TestServer {
    addr: SocketAddr,
    home: TempDir,
    token: CancellationToken,
    handle: JoinHandle<anyhow::Result<()>>,
}

fn fast_transfer() -> TransferConfig {
    TransferConfig {
        buffer_size: 1024,
        settle_delay_ms: 20,
        connect_attempts: 20,
        data_timeout_secs: Some(10),
    }
}

async fn start_server() -> TestServer {
    let home = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.server.home_dir = home.path().to_path_buf();
    config.server.username = "alice".to_string();
    config.server.password = "secret".to_string();
    config.transfer = fast_transfer();

    let context = Arc::new(ServerContext::from_config(&config).unwrap());
    let server = FtpServer::bind("127.0.0.1:0", context).await.unwrap();
    let addr = server.local_addr().unwrap();
    let token = CancellationToken::new();
    let handle = tokio::spawn(server.run(token.clone()));

    TestServer {
        addr,
        home,
        token,
        handle,
    }
}

async fn connect(server: &TestServer, local_dir: &Path) -> FtpClient {
    FtpClient::connect("127.0.0.1", server.addr.port(), local_dir.to_path_buf(), &fast_transfer())
        .await
        .unwrap()
}

async fn run(client: &mut FtpClient, line: &str) -> String {
    client.execute(&parse_command(line)).await.unwrap()
}

async fn login(client: &mut FtpClient) {
    assert!(run(client, "user alice").await.starts_with("331"));
    let welcome = run(client, "pass secret").await;
    assert!(welcome.starts_with("230-"), "{}", welcome);
    assert!(welcome.lines().last().unwrap().starts_with("230 Current directory: "));
}

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn test_greeting() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    let client = connect(&server, local.path()).await;
    assert!(client.greeting().starts_with("220"));
}

#[tokio::test]
async fn test_commands_need_login() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    std::fs::write(server.home.path().join("f"), b"x").unwrap();
    let mut client = connect(&server, local.path()).await;

    let lines = [
        "ls", "pwd", "cd x", "cdup", "mkdir d", "rmdir d", "rm f", "rnfr f", "rnto g", "port",
        "pasv", "get f",
    ];
    // Twice, in both orders: the answer never changes.
    for line in lines.iter().chain(lines.iter().rev()) {
        let reply = run(&mut client, line).await;
        assert_eq!(reply, "530 Not logged in.", "{}", line);
    }
    assert!(server.home.path().join("f").exists());
    assert!(!server.home.path().join("d").exists());

    login(&mut client).await;
    assert!(run(&mut client, "pwd").await.starts_with("200"));
}

#[tokio::test]
async fn test_user_pass_ordering() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    let mut client = connect(&server, local.path()).await;

    assert_eq!(run(&mut client, "user bob").await, "530 Invalid username.");
    assert_eq!(run(&mut client, "pass secret").await, "530 Invalid username.");
    assert_eq!(run(&mut client, "ls").await, "530 Not logged in.");

    assert!(run(&mut client, "user alice").await.starts_with("331"));
    assert_eq!(run(&mut client, "user alice").await, "503 Username already provided.");
    assert_eq!(run(&mut client, "pass wrong").await, "530 Invalid password.");
    assert!(run(&mut client, "pass secret").await.starts_with("230"));
    assert_eq!(run(&mut client, "user alice").await, "230 Already logged in.");
    assert_eq!(run(&mut client, "pass secret").await, "230 Already logged in.");
}

#[tokio::test]
async fn test_pending_rename_blocks_other_commands() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    std::fs::write(server.home.path().join("a.txt"), b"original").unwrap();
    let mut client = connect(&server, local.path()).await;
    login(&mut client).await;

    assert!(run(&mut client, "rnfr a.txt").await.starts_with("200"));
    for line in ["ls", "pwd", "mkdir x", "rnfr a.txt", "pasv"] {
        assert_eq!(
            run(&mut client, line).await,
            "503 Rename not completed, send RNTO.",
            "{}",
            line
        );
    }
    assert!(!server.home.path().join("x").exists());

    assert!(run(&mut client, "rnto b.txt").await.starts_with("200"));
    assert!(!server.home.path().join("a.txt").exists());
    assert_eq!(
        std::fs::read(server.home.path().join("b.txt")).unwrap(),
        b"original"
    );
    assert!(run(&mut client, "pwd").await.starts_with("200"));
}

#[tokio::test]
async fn test_rnto_without_rnfr() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    std::fs::write(server.home.path().join("a.txt"), b"x").unwrap();
    let mut client = connect(&server, local.path()).await;
    login(&mut client).await;

    let reply = run(&mut client, "rnto b.txt").await;
    assert_eq!(reply, "503 No file to rename, send RNFR first.");
    assert!(server.home.path().join("a.txt").exists());
    assert!(!server.home.path().join("b.txt").exists());
}

#[tokio::test]
async fn test_list_order() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    let home = server.home.path();
    std::fs::write(home.join("b.txt"), b"b").unwrap();
    std::fs::create_dir(home.join("a")).unwrap();
    std::fs::create_dir(home.join("c")).unwrap();
    std::fs::write(home.join("a.txt"), b"a").unwrap();
    let mut client = connect(&server, local.path()).await;
    login(&mut client).await;

    let reply = run(&mut client, "ls").await;
    let lines: Vec<&str> = reply.lines().collect();
    assert!(lines.first().unwrap().starts_with("200-"));
    assert!(lines.last().unwrap().starts_with("200 "));
    let entries: Vec<&str> = lines[1..lines.len() - 1]
        .iter()
        .map(|line| line.trim_start_matches("200-"))
        .collect();
    assert_eq!(entries, vec!["a/", "c/", "a.txt", "b.txt"]);
}

#[tokio::test]
async fn test_directory_commands() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    let home = server.home.path().canonicalize().unwrap();
    let mut client = connect(&server, local.path()).await;
    login(&mut client).await;

    assert!(run(&mut client, "mkdir docs").await.starts_with("200"));
    assert_eq!(run(&mut client, "mkdir docs").await, "550 Directory already exists.");
    assert_eq!(run(&mut client, "mkdir ..").await, "550 Invalid name.");
    assert_eq!(
        run(&mut client, "pwd").await,
        format!("200 Current directory: {}", home.display())
    );

    assert!(run(&mut client, "cd docs").await.starts_with("200"));
    assert_eq!(
        run(&mut client, "pwd").await,
        format!("200 Current directory: {}", home.join("docs").display())
    );
    assert_eq!(run(&mut client, "cd missing").await, "550 Directory not found.");
    assert!(run(&mut client, "cdup").await.starts_with("200"));

    std::fs::write(home.join("docs").join("inner"), b"x").unwrap();
    assert_eq!(run(&mut client, "rmdir docs").await, "550 Directory not empty.");
    assert_eq!(run(&mut client, "rm docs").await, "550 Path is not a regular file.");
    assert!(run(&mut client, "rm docs/inner").await.starts_with("200"));
    assert!(run(&mut client, "rmdir docs").await.starts_with("200"));
    assert!(!home.join("docs").exists());
}

#[tokio::test]
async fn test_cwd_above_home() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    let home = server.home.path().canonicalize().unwrap();
    let mut client = connect(&server, local.path()).await;
    login(&mut client).await;

    assert!(run(&mut client, "cd ..").await.starts_with("200"));
    assert_eq!(
        run(&mut client, "pwd").await,
        format!("200 Current directory: {}", home.parent().unwrap().display())
    );
}

async fn round_trip(client: &mut FtpClient, server: &TestServer, local: &Path) {
    let payload: Vec<u8> = (0..20_000u32).map(|i| (i * 31 % 256) as u8).collect();
    std::fs::write(local.join("payload.bin"), &payload).unwrap();

    let reply = run(client, "put payload.bin").await;
    assert!(reply.starts_with("200"), "{}", reply);
    // The server is done with the upload once it answers the next command.
    assert!(run(client, "pwd").await.starts_with("200"));
    assert_eq!(
        std::fs::read(server.home.path().join("payload.bin")).unwrap(),
        payload
    );

    std::fs::remove_file(local.join("payload.bin")).unwrap();
    let reply = run(client, "get payload.bin").await;
    assert!(reply.starts_with("200"), "{}", reply);
    assert_eq!(std::fs::read(local.join("payload.bin")).unwrap(), payload);

    // The control channel is still in step after both transfers.
    assert!(run(client, "pwd").await.starts_with("200"));
}

#[tokio::test]
async fn test_round_trip_passive() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    let mut client = connect(&server, local.path()).await;
    login(&mut client).await;

    assert!(run(&mut client, "pasv").await.starts_with("200"));
    assert_eq!(client.transfer_mode(), TransferMode::Passive);
    round_trip(&mut client, &server, local.path()).await;
}

#[tokio::test]
async fn test_round_trip_active() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    let mut client = connect(&server, local.path()).await;
    login(&mut client).await;

    let port = free_port();
    let reply = run(&mut client, &format!("port {}", port)).await;
    assert_eq!(reply, format!("200 PORT command successful, data port {}.", port));
    assert_eq!(client.transfer_mode(), TransferMode::Active(port));
    round_trip(&mut client, &server, local.path()).await;
}

#[tokio::test]
async fn test_stor_overwrites_existing_file() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    std::fs::write(server.home.path().join("notes.txt"), b"old and somewhat longer").unwrap();
    std::fs::write(local.path().join("notes.txt"), b"new").unwrap();
    let mut client = connect(&server, local.path()).await;
    login(&mut client).await;

    assert!(run(&mut client, "put notes.txt").await.starts_with("200"));
    assert!(run(&mut client, "pwd").await.starts_with("200"));
    assert_eq!(std::fs::read(server.home.path().join("notes.txt")).unwrap(), b"new");
}

#[tokio::test]
async fn test_failed_transfer_keeps_session() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    std::fs::write(server.home.path().join("f.bin"), vec![7u8; 4096]).unwrap();
    // Nowhere to save the download.
    let mut client = connect(&server, &local.path().join("missing")).await;
    login(&mut client).await;

    let err = client.execute(&parse_command("get f.bin")).await.unwrap_err();
    assert!(matches!(err, ClientError::Transfer(_)), "{:?}", err);
    assert!(!err.is_fatal());

    let home = server.home.path().canonicalize().unwrap();
    assert_eq!(
        run(&mut client, "pwd").await,
        format!("200 Current directory: {}", home.display())
    );
    assert!(run(&mut client, "mkdir after").await.starts_with("200"));
}

#[tokio::test]
async fn test_replies_longer_than_a_command() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    let mut client = connect(&server, local.path()).await;
    login(&mut client).await;

    let name = "d".repeat(200);
    let mut expected = server.home.path().canonicalize().unwrap();
    for _ in 0..6 {
        assert!(run(&mut client, &format!("mkdir {}", name)).await.starts_with("200"));
        let reply = run(&mut client, &format!("cd {}", name)).await;
        expected = expected.join(&name);
        assert_eq!(reply, format!("200 Directory changed to {}.", expected.display()));
    }
    assert!(expected.as_os_str().len() > 1024);

    assert_eq!(
        run(&mut client, "pwd").await,
        format!("200 Current directory: {}", expected.display())
    );
    assert!(run(&mut client, "mkdir leaf").await.starts_with("200"));
}

#[tokio::test]
async fn test_rejected_port_keeps_mode() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    let mut client = connect(&server, local.path()).await;
    login(&mut client).await;

    assert_eq!(run(&mut client, "port 80").await, "501 Invalid port.");
    assert_eq!(run(&mut client, "port nope").await, "501 Invalid port.");
    assert_eq!(client.transfer_mode(), TransferMode::Passive);
}

#[tokio::test]
async fn test_transfer_refusals_keep_session() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    let mut client = connect(&server, local.path()).await;
    login(&mut client).await;

    assert_eq!(run(&mut client, "get missing.bin").await, "550 File not found.");
    assert!(!local.path().join("missing.bin").exists());

    let result = client.execute(&parse_command("put nothing-here.bin")).await;
    assert!(matches!(result, Err(ClientError::LocalFileNotFound(_))));

    assert!(run(&mut client, "pwd").await.starts_with("200"));
}

#[tokio::test]
async fn test_help_noop_and_quit_on_the_wire() {
    let server = start_server().await;
    let stream = TcpStream::connect(server.addr).await.unwrap();
    let mut control = ControlChannel::new(stream).unwrap();
    assert!(control.receive_reply().await.unwrap().unwrap().starts_with("220"));

    control.send_message("HELP").await.unwrap();
    assert_eq!(
        control.receive_reply().await.unwrap().unwrap(),
        "502 Command not implemented."
    );

    // Garbage gets no answer at all, so the next reply belongs to QUIT.
    control.send_message("FROB the widget").await.unwrap();
    control.send_message("").await.unwrap();
    control.send_message("QUIT").await.unwrap();
    assert_eq!(control.receive_reply().await.unwrap().unwrap(), "221 Goodbye.");
    assert_eq!(control.receive_message().await.unwrap(), None);
}

#[tokio::test]
async fn test_help_is_local() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    let mut client = connect(&server, local.path()).await;

    let help = run(&mut client, "help").await;
    assert!(help.contains("RNFR"));
    // Still not logged in and still in step.
    assert_eq!(run(&mut client, "pwd").await, "530 Not logged in.");
}

#[tokio::test]
async fn test_quit_closes_session() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    let mut client = connect(&server, local.path()).await;

    assert_eq!(run(&mut client, "quit").await, "221 Goodbye.");
    let err = client.execute(&parse_command("pwd")).await.unwrap_err();
    assert!(err.is_fatal(), "{:?}", err);
}

#[tokio::test]
async fn test_shutdown_ends_sessions() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    let mut client = connect(&server, local.path()).await;
    login(&mut client).await;

    server.token.cancel();
    server.handle.await.unwrap().unwrap();

    let err = client.execute(&parse_command("pwd")).await.unwrap_err();
    assert!(err.is_fatal(), "{:?}", err);
    assert!(TcpStream::connect(server.addr).await.is_err());
}

#[tokio::test]
async fn test_shutdown_during_transfer() {
    let server = start_server().await;
    std::fs::write(server.home.path().join("f"), b"hello").unwrap();
    let stream = TcpStream::connect(server.addr).await.unwrap();
    let mut control = ControlChannel::new(stream).unwrap();
    assert!(control.receive_reply().await.unwrap().unwrap().starts_with("220"));

    control.send_message("USER alice").await.unwrap();
    assert!(control.receive_reply().await.unwrap().unwrap().starts_with("331"));
    control.send_message("PASS secret").await.unwrap();
    assert!(control.receive_reply().await.unwrap().unwrap().starts_with("230"));

    // The server waits for a data connection that never comes.
    control.send_message("RETR f").await.unwrap();
    let reply = control.receive_reply().await.unwrap().unwrap();
    assert!(reply.starts_with("200"), "{}", reply);

    server.token.cancel();
    let stopped = tokio::time::timeout(Duration::from_secs(3), server.handle).await;
    assert!(stopped.is_ok(), "server still running after shutdown");
    assert_eq!(control.receive_message().await.unwrap(), None);
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let server = start_server().await;
    let local = tempfile::tempdir().unwrap();
    let mut first = connect(&server, local.path()).await;
    let mut second = connect(&server, local.path()).await;

    login(&mut first).await;
    assert_eq!(run(&mut second, "pwd").await, "530 Not logged in.");
    assert!(run(&mut first, "pwd").await.starts_with("200"));
}
