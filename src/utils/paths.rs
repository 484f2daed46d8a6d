use dirs::home_dir;
use std::{env, path::PathBuf};

pub const HOME_ENV: &str = "EXPENSE_CORE_HOME";
const DEFAULT_DIR_NAME: &str = ".expense_core";
const DATA_DIR: &str = "data";

/// Returns the application data directory, defaulting to `~/.expense_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding the key-value store files under `base`.
pub fn store_dir_in(base: &std::path::Path) -> PathBuf {
    base.join(DATA_DIR)
}
