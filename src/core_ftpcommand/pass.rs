use crate::core_auth::Credentials;
use crate::core_ftpcommand::error::SessionError;
use crate::core_ftpcommand::handlers::SessionContext;
use crate::helpers::send_result;
use crate::session::Session;
use log::{info, warn};
use std::path::Path;

/// Applies PASS to the session. A wrong password leaves the username accepted.
pub fn check_password(
    session: &mut Session,
    credentials: &Credentials,
    password: &str,
) -> Result<(), SessionError> {
    if session.is_authenticated {
        return Err(SessionError::AlreadyLoggedIn);
    }
    if !session.username_accepted {
        return Err(SessionError::InvalidUsername);
    }
    if !credentials.matches_password(password) {
        return Err(SessionError::InvalidPassword);
    }

    session.authenticate();
    Ok(())
}

/// Lines of the 230 welcome reply, current directory last.
pub fn welcome_lines(banner: Option<&str>, current_dir: &Path) -> Vec<String> {
    let mut lines: Vec<String> = banner
        .map(|text| text.lines().map(str::to_string).collect())
        .unwrap_or_default();
    lines.push("User logged in, proceed.".to_string());
    lines.push(format!("Current directory: {}", current_dir.display()));
    lines
}

/// Handles the PASS FTP command.
pub async fn handle_pass_command(ctx: &mut SessionContext, password: &str) -> std::io::Result<()> {
    match check_password(&mut ctx.session, &ctx.server.credentials, password) {
        Ok(()) => {
            info!(
                "User {} logged in from {}",
                ctx.server.credentials.get_username(),
                ctx.control.peer_addr()
            );
            let lines = welcome_lines(ctx.server.banner.as_deref(), &ctx.session.current_dir);
            ctx.control.send_multiline(230, &lines).await
        }
        Err(e) => {
            if e == SessionError::InvalidPassword {
                warn!("Invalid password from {}", ctx.control.peer_addr());
            }
            send_result(&mut ctx.control, Err(e)).await
        }
    }
}
