use crate::core_ftpcommand::error::SessionError;
use crate::core_ftpcommand::handlers::SessionContext;
use crate::helpers::send_result;
use log::{debug, warn};
use std::path::Path;
use tokio::fs;

/// One directory entry as shown by LIST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub name: String,
    pub is_dir: bool,
}

impl ListEntry {
    /// Directories get a trailing `/`. Control characters show as `?` so a
    /// name can never break the reply framing.
    pub fn render(&self) -> String {
        let name: String = self
            .name
            .chars()
            .map(|c| if c.is_control() { '?' } else { c })
            .collect();
        if self.is_dir {
            format!("{}/", name)
        } else {
            name
        }
    }
}

/// Directories first, then byte-wise lexicographic order within each group.
pub fn sort_entries(entries: &mut [ListEntry]) {
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
}

pub async fn read_entries(dir: &Path) -> Result<Vec<ListEntry>, SessionError> {
    match fs::metadata(dir).await {
        Ok(metadata) if metadata.is_dir() => {}
        _ => return Err(SessionError::CurrentDirectoryGone),
    }

    let failed = |e: std::io::Error| SessionError::OperationFailed {
        action: "list directory",
        reason: e.to_string(),
    };

    let mut read_dir = fs::read_dir(dir).await.map_err(failed)?;
    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await.map_err(failed)? {
        // Follow symlinks so a link to a directory lists as one.
        let is_dir = match fs::metadata(entry.path()).await {
            Ok(metadata) => metadata.is_dir(),
            Err(e) => {
                warn!("Could not stat {:?}: {}", entry.path(), e);
                false
            }
        };
        entries.push(ListEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }
    Ok(entries)
}

/// Handles the LIST FTP command. The listing goes back on the control channel
/// as one multi-line 200 reply.
pub async fn handle_list_command(ctx: &mut SessionContext) -> std::io::Result<()> {
    let current_dir = ctx.session.current_dir.clone();
    match read_entries(&current_dir).await {
        Ok(mut entries) => {
            sort_entries(&mut entries);
            debug!("Listing {} entries of {}", entries.len(), current_dir.display());

            let mut lines = Vec::with_capacity(entries.len() + 2);
            lines.push(format!("Listing of {}:", current_dir.display()));
            lines.extend(entries.iter().map(ListEntry::render));
            lines.push(format!("End of listing, {} entries.", entries.len()));
            ctx.control.send_multiline(200, &lines).await
        }
        Err(e) => send_result(&mut ctx.control, Err(e)).await,
    }
}
