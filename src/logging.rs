//! Tracing setup
//!
//! The terminal belongs to the TUI, so log lines go to a file.
//!
//!   RUST_LOG=locsearch=debug locsearch   # Fine-grained log control

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// `<data dir>/locsearch/locsearch.log`, or the working directory without one.
pub fn default_log_path() -> PathBuf {
    dirs_next::data_local_dir()
        .map(|dir| dir.join("locsearch"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("locsearch.log")
}

/// Initialize tracing, appending to `path` (default filter: info)
pub fn init_tracing(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| io::Error::other(format!("tracing init failed: {err}")))
}
