use log::debug;

/// Unrecognised or malformed lines end up here. Nothing is sent back.
pub fn handle_noop_command() {
    debug!("Ignoring unrecognised input");
}
