use rustyline::history::{FileHistory, History};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

const HISTORY_FILE_NAME: &str = "history.txt";

/// Picks the history file: an explicit path (from `--history` or
/// `MINISCHEME_HISTORY`) wins over `<data dir>/minischeme/history.txt`.
/// `None` means history stays in memory.
pub(crate) fn resolve_history_path(history_override: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = history_override {
        debug!(path = %path.display(), "Using explicit history path");
        return Some(path);
    }
    dirs::data_dir().or_else(dirs::config_dir).map(|mut path| {
        path.push(env!("CARGO_PKG_NAME"));
        path.push(HISTORY_FILE_NAME);
        path
    })
}

/// Loads history from `path`, creating its parent directory first. Returns
/// `Ok(false)` when there is no file yet.
pub(crate) fn load_history(history: &mut FileHistory, path: &Path) -> rustyline::Result<bool> {
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() {
            fs::create_dir_all(parent_dir)?;
        }
    }
    match history.load(path) {
        Ok(()) => Ok(true),
        Err(rustyline::error::ReadlineError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

pub(crate) fn save_history(history: &mut FileHistory, path: &Path) -> rustyline::Result<()> {
    history.save(path)
}
