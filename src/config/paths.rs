use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};

/// Environment variable overriding the log directory
pub const LOG_DIR_ENV: &str = "SIMPLYSSH_LOG_DIR";

/// Identity files tried when no key is given, in order
const DEFAULT_IDENTITIES: [&str; 3] = ["id_ed25519", "id_rsa", "id_ecdsa"];

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "simplyssh", "simplyssh")
}

/// `settings.toml` in the per-user config directory
pub fn settings_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("settings.toml"))
}

/// Directory for the rolling log file. `SIMPLYSSH_LOG_DIR` wins; set but
/// blank, it disables file logging.
pub fn log_dir() -> Option<PathBuf> {
    match std::env::var(LOG_DIR_ENV) {
        Ok(raw) if raw.trim().is_empty() => None,
        Ok(raw) => Some(PathBuf::from(raw.trim())),
        Err(_) => project_dirs().map(|dirs| dirs.data_local_dir().join("logs")),
    }
}

/// Replace a leading `~` with the home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(rest),
        None => path.to_path_buf(),
    }
}

/// `~/.ssh/config`
pub fn ssh_config_file() -> Option<PathBuf> {
    ssh_dir().map(|dir| dir.join("config"))
}

pub fn default_identity_files() -> Vec<PathBuf> {
    ssh_dir()
        .map(|dir| DEFAULT_IDENTITIES.iter().map(|name| dir.join(name)).collect())
        .unwrap_or_default()
}

fn ssh_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(".ssh"))
}
