use crate::core_ftpcommand::cwd::move_to;
use crate::core_ftpcommand::handlers::SessionContext;

/// CDUP is CWD `..`.
pub async fn handle_cdup_command(ctx: &mut SessionContext) -> std::io::Result<()> {
    move_to(ctx, "..").await
}
