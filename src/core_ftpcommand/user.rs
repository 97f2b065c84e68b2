use crate::core_auth::Credentials;
use crate::core_ftpcommand::error::SessionError;
use crate::core_ftpcommand::handlers::SessionContext;
use crate::helpers::send_result;
use crate::session::Session;
use log::info;

/// Applies USER to the session.
///
/// Only the configured name moves the session on to waiting for a password; a
/// wrong name leaves it where it was.
pub fn accept_user(
    session: &mut Session,
    credentials: &Credentials,
    username: &str,
) -> Result<String, SessionError> {
    if session.is_authenticated {
        return Err(SessionError::AlreadyLoggedIn);
    }
    if session.username_accepted {
        return Err(SessionError::UsernameAlreadyProvided);
    }
    if !credentials.matches_username(username) {
        return Err(SessionError::InvalidUsername);
    }

    session.accept_username();
    Ok("331 User name okay, need password.".to_string())
}

/// Handles the USER FTP command.
pub async fn handle_user_command(ctx: &mut SessionContext, username: &str) -> std::io::Result<()> {
    info!("Received USER command with username: {}", username);
    let result = accept_user(&mut ctx.session, &ctx.server.credentials, username);
    if result.is_ok() {
        info!("Username accepted: {}", username);
    }
    send_result(&mut ctx.control, result).await
}
