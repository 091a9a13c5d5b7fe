//! SFTP session over an established SSH connection

use std::path::Path;

use russh_sftp::client::SftpSession as RusshSftpSession;
use russh_sftp::client::fs::File as RemoteFile;

use crate::error::SftpError;
use crate::security_log;
use crate::ssh::SshConnection;

use super::progress::Progress;
use super::transfer::{self, RemoteFs, RemoteWrite};
use super::types::{RemoteEntry, TransferSummary, join_remote};

/// SFTP subsystem session bound to one connection
pub struct SftpSession {
    sftp: RusshSftpSession,
    host: String,
    port: u16,
}

impl std::fmt::Debug for SftpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SftpSession")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

impl SftpSession {
    /// Open a session channel on `connection` and start the `sftp` subsystem
    pub async fn open(connection: &SshConnection) -> Result<Self, SftpError> {
        let channel = connection
            .handle()
            .channel_open_session()
            .await
            .map_err(|e| SftpError::ConnectionFailed(format!("Failed to open channel: {}", e)))?;

        channel
            .request_subsystem(true, "sftp")
            .await
            .map_err(|e| {
                SftpError::ConnectionFailed(format!("Failed to request SFTP subsystem: {}", e))
            })?;

        let sftp = RusshSftpSession::new(channel.into_stream())
            .await
            .map_err(|e| {
                SftpError::ConnectionFailed(format!("Failed to initialize SFTP session: {}", e))
            })?;

        security_log::log_sftp_connect(connection.host(), connection.port());

        Ok(Self {
            sftp,
            host: connection.host().to_string(),
            port: connection.port(),
        })
    }

    /// Copy one remote file to a local path
    pub async fn download_file(
        &self,
        remote_path: &str,
        local_path: &Path,
        progress: Progress<'_>,
    ) -> Result<u64, SftpError> {
        transfer::download_file(self, remote_path, local_path, progress).await
    }

    /// Copy a remote directory tree to a local path
    pub async fn download_dir(
        &self,
        remote_dir: &str,
        local_dir: &Path,
        progress: Progress<'_>,
    ) -> Result<TransferSummary, SftpError> {
        transfer::download_dir(self, remote_dir, local_dir, progress).await
    }

    /// Copy a local file to `remote_path`, replacing any existing file
    pub async fn upload_file(
        &self,
        local_path: &Path,
        remote_path: &str,
        progress: Progress<'_>,
    ) -> Result<u64, SftpError> {
        transfer::upload_file(self, local_path, remote_path, progress).await
    }

    /// Copy a local directory tree to `remote_dir`, creating remote
    /// directories that do not exist yet
    pub async fn upload_dir(
        &self,
        local_dir: &Path,
        remote_dir: &str,
        progress: Progress<'_>,
    ) -> Result<TransferSummary, SftpError> {
        transfer::upload_dir(self, local_dir, remote_dir, progress).await
    }

    /// Create a remote directory unless it already exists
    pub async fn create_dir(&self, path: &str) -> Result<(), SftpError> {
        match self.sftp.try_exists(path).await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => {
                return Err(SftpError::FileOperation(format!(
                    "Failed to check directory {}: {}",
                    path, e
                )));
            }
        }

        self.sftp.create_dir(path).await.map_err(|e| {
            SftpError::FileOperation(format!("Failed to create directory {}: {}", path, e))
        })
    }

    /// End the SFTP session. The SSH connection stays open.
    pub async fn close(self) -> Result<(), SftpError> {
        self.sftp.close().await.map_err(|e| {
            SftpError::ConnectionFailed(format!(
                "Failed to close SFTP session on {}:{}: {}",
                self.host, self.port, e
            ))
        })
    }
}

impl RemoteFs for SftpSession {
    type File = RemoteFile;

    async fn read_dir(&self, path: &str) -> Result<Vec<RemoteEntry>, SftpError> {
        let listing = self.sftp.read_dir(path).await.map_err(|e| {
            SftpError::FileOperation(format!("Failed to read directory {}: {}", path, e))
        })?;

        Ok(listing
            .map(|entry| {
                let name = entry.file_name();
                RemoteEntry {
                    path: join_remote(path, &name),
                    is_dir: entry.file_type().is_dir(),
                    size: entry.metadata().size,
                    name,
                }
            })
            .collect())
    }

    async fn open(&self, path: &str) -> Result<Self::File, SftpError> {
        self.sftp.open(path).await.map_err(|e| {
            SftpError::Transfer(format!("Failed to open remote file {}: {}", path, e))
        })
    }

    async fn file_size(&self, path: &str) -> Option<u64> {
        match self.sftp.metadata(path).await {
            Ok(attrs) => attrs.size,
            Err(e) => {
                tracing::debug!("Could not stat {}: {}", path, e);
                None
            }
        }
    }
}

impl RemoteWrite for SftpSession {
    type Writer = RemoteFile;

    async fn create(&self, path: &str) -> Result<Self::Writer, SftpError> {
        self.sftp.create(path).await.map_err(|e| {
            SftpError::Transfer(format!("Failed to create remote file {}: {}", path, e))
        })
    }

    async fn ensure_dir(&self, path: &str) -> Result<(), SftpError> {
        self.create_dir(path).await
    }
}
