use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid port '{port}' for host '{host}'")]
    InvalidPort { host: String, port: String },

    #[error("Host not found: {0}")]
    HostNotFound(String),
}

/// SSH-related errors
#[derive(Error, Debug)]
pub enum SshError {
    #[error("Connection failed to {host}:{port}: {reason}")]
    ConnectionFailed {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Key file error: {0}")]
    KeyFile(String),

    #[error("Key file {0} is encrypted and needs a passphrase")]
    KeyFilePassphraseRequired(PathBuf),

    #[error("Wrong passphrase for key file {0}")]
    KeyFilePassphraseInvalid(PathBuf),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Command '{command}' failed ({reason})")]
    CommandFailed {
        command: String,
        reason: String,
        /// Standard output captured before the failure
        output: Vec<u8>,
    },

    #[error("Timeout connecting to {0}")]
    Timeout(String),

    #[error("Invalid host: {0}")]
    InvalidHost(#[from] ConfigError),

    #[error("russh error: {0}")]
    Russh(String),
}

impl From<russh::Error> for SshError {
    fn from(err: russh::Error) -> Self {
        SshError::Russh(err.to_string())
    }
}

/// SFTP-related errors
#[derive(Error, Debug)]
pub enum SftpError {
    #[error("SFTP connection failed: {0}")]
    ConnectionFailed(String),

    #[error("File operation failed: {0}")]
    FileOperation(String),

    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("Local I/O error: {0}")]
    LocalIo(String),
}
