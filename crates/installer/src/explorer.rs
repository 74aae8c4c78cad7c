use std::io;
use std::path::Path;
use std::process::Command;

/// Opens `path` in the platform file manager without waiting for it.
pub fn reveal_in_file_manager(path: &Path) -> io::Result<()> {
    let program = if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };

    Command::new(program).arg(path).spawn()?;
    tracing::debug!(program, path = %path.display(), "opened file manager");
    Ok(())
}
