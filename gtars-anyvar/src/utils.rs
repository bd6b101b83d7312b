use super::consts::{
    ANYVAR_STORE_ENV, DEFAULT_SEQREPO_DIR, DEFAULT_STORE_FILENAME, DEFAULT_STORE_FOLDER,
    SEQREPO_DIR_ENV,
};
use dirs::home_dir;
use std::env;
use std::path::{Path, PathBuf};

/// Get the reference sequence directory from the environment, falling back to
/// the conventional seqrepo install location
///
/// # Returns
/// - path to the sequence directory
pub fn get_default_seqrepo_dir() -> PathBuf {
    env::var(SEQREPO_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SEQREPO_DIR))
}

/// Get the object store path from the environment, if not available then place it
/// in the home folder
///
/// # Returns
/// - path to the SQLite store file
pub fn get_default_store_path() -> PathBuf {
    if let Ok(val) = env::var(ANYVAR_STORE_ENV) {
        PathBuf::from(val)
    } else {
        let home = env::var("HOME")
            .or_else(|_| {
                home_dir()
                    .map(|p| p.to_string_lossy().into_owned())
                    .ok_or(std::env::VarError::NotPresent)
            })
            .unwrap_or_else(|_| "/tmp".to_string());

        let mut path = PathBuf::from(home);
        path.push(DEFAULT_STORE_FOLDER);
        path.push(DEFAULT_STORE_FILENAME);
        path
    }
}

/// Expand `~` and environment variables in a user supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy().into_owned();
    let expanded = shellexpand::full(&raw)
        .map(|s| s.into_owned())
        .unwrap_or(raw);
    PathBuf::from(expanded)
}
