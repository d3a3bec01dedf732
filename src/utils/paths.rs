use dirs::home_dir;
use std::{
    env, io,
    path::{Path, PathBuf},
};

const DEFAULT_DIR_NAME: &str = ".tuition_core";
const LEDGER_DIR: &str = "ledgers";
const BACKUP_DIR: &str = "backups";
const ROSTER_FILE: &str = "roster.json";
const STATE_FILE: &str = "state.json";
const CONFIG_FILE: &str = "config.json";

/// Returns the application-specific data directory, defaulting to
/// `~/.tuition_core`. `TUITION_CORE_HOME` overrides it.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("TUITION_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn ledgers_dir_in(base: &Path) -> PathBuf {
    base.join(LEDGER_DIR)
}

pub fn backups_dir_in(base: &Path) -> PathBuf {
    base.join(BACKUP_DIR)
}

pub fn roster_file_in(base: &Path) -> PathBuf {
    base.join(ROSTER_FILE)
}

pub fn state_file_in(base: &Path) -> PathBuf {
    base.join(STATE_FILE)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    std::fs::create_dir_all(path)
}
