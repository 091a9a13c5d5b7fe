//! Copies between local disk and a remote filesystem
//!
//! The tree walks only need to list, open, create files and make
//! directories, so they are written against [`RemoteFs`] and [`RemoteWrite`]
//! and work with any backend providing those.

use std::future::Future;
use std::path::Path;

use tokio::fs::{DirBuilder, File, OpenOptions};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::error::SftpError;

use super::progress::{Direction, Progress, ProgressEvent, ProgressReader};
use super::types::{RemoteEntry, TransferSummary, join_remote};

/// Read access to a remote filesystem
pub trait RemoteFs: Sync {
    type File: AsyncRead + Unpin + Send;

    /// List a directory. Entries carry their full remote path.
    fn read_dir(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Vec<RemoteEntry>, SftpError>> + Send;

    fn open(&self, path: &str) -> impl Future<Output = Result<Self::File, SftpError>> + Send;

    /// Size of a remote file, `None` when the server does not report one
    fn file_size(&self, path: &str) -> impl Future<Output = Option<u64>> + Send;
}

/// Write access to a remote filesystem
pub trait RemoteWrite: Sync {
    type Writer: AsyncWrite + Unpin + Send;

    /// Create a remote file, truncating an existing one
    fn create(&self, path: &str) -> impl Future<Output = Result<Self::Writer, SftpError>> + Send;

    /// Create a remote directory unless it already exists. The parent must
    /// exist.
    fn ensure_dir(&self, path: &str) -> impl Future<Output = Result<(), SftpError>> + Send;
}

/// Copy one remote file to `local_path`, replacing whatever is there.
///
/// Missing parent directories are created. Returns the number of bytes
/// copied.
pub async fn download_file<F: RemoteFs>(
    fs: &F,
    remote_path: &str,
    local_path: &Path,
    progress: Progress<'_>,
) -> Result<u64, SftpError> {
    fetch_file(fs, remote_path, local_path, None, progress).await
}

/// Mirror a remote directory tree under `local_dir`, depth first.
///
/// The first failure aborts the whole copy; files already written stay.
pub async fn download_dir<F: RemoteFs>(
    fs: &F,
    remote_dir: &str,
    local_dir: &Path,
    progress: Progress<'_>,
) -> Result<TransferSummary, SftpError> {
    let entries = fs.read_dir(remote_dir).await?;
    create_local_dir(local_dir).await?;

    let mut summary = TransferSummary {
        directories: 1,
        ..Default::default()
    };

    for entry in entries {
        if entry.is_self_or_parent() {
            continue;
        }

        let target = local_dir.join(&entry.name);

        if entry.is_dir {
            let nested = Box::pin(download_dir(fs, &entry.path, &target, progress)).await?;
            summary.merge(nested);
        } else {
            let bytes = fetch_file(fs, &entry.path, &target, entry.size, progress).await?;
            summary.add_file(bytes);
        }
    }

    Ok(summary)
}

/// Listings already carry sizes; only a bare file download asks for one.
async fn fetch_file<F: RemoteFs>(
    fs: &F,
    remote_path: &str,
    local_path: &Path,
    listed_size: Option<u64>,
    progress: Progress<'_>,
) -> Result<u64, SftpError> {
    let remote = fs.open(remote_path).await?;
    let total_bytes = match listed_size {
        Some(size) => size,
        None => fs.file_size(remote_path).await.unwrap_or(0),
    };

    if let Some(parent) = local_path.parent() {
        if !parent.as_os_str().is_empty() {
            create_local_dir(parent).await?;
        }
    }

    let mut local = create_local_file(local_path).await?;

    progress.emit(ProgressEvent::Started {
        direction: Direction::Download,
        source: remote_path.to_string(),
        destination: local_path.display().to_string(),
        total_bytes,
    });

    let mut reader =
        ProgressReader::new(remote, Direction::Download, remote_path, total_bytes, progress);
    let bytes = tokio::io::copy(&mut reader, &mut local)
        .await
        .map_err(|e| {
            SftpError::Transfer(format!(
                "Failed to download {} to {}: {}",
                remote_path,
                local_path.display(),
                e
            ))
        })?;

    local.flush().await.map_err(|e| {
        SftpError::LocalIo(format!(
            "Failed to write local file {}: {}",
            local_path.display(),
            e
        ))
    })?;

    progress.emit(ProgressEvent::Completed {
        direction: Direction::Download,
        destination: local_path.display().to_string(),
        bytes,
    });
    tracing::debug!("Downloaded {} ({} bytes)", remote_path, bytes);

    Ok(bytes)
}

/// Copy a local file to `remote_path`, replacing any existing file
pub async fn upload_file<W: RemoteWrite>(
    fs: &W,
    local_path: &Path,
    remote_path: &str,
    progress: Progress<'_>,
) -> Result<u64, SftpError> {
    let local = File::open(local_path).await.map_err(|e| {
        SftpError::LocalIo(format!(
            "Failed to read local file {}: {}",
            local_path.display(),
            e
        ))
    })?;
    let total_bytes = local.metadata().await.map(|m| m.len()).map_err(|e| {
        SftpError::LocalIo(format!(
            "Failed to stat local file {}: {}",
            local_path.display(),
            e
        ))
    })?;

    let mut remote = fs.create(remote_path).await?;

    let source = local_path.display().to_string();
    progress.emit(ProgressEvent::Started {
        direction: Direction::Upload,
        source: source.clone(),
        destination: remote_path.to_string(),
        total_bytes,
    });

    let mut reader = ProgressReader::new(local, Direction::Upload, source, total_bytes, progress);
    let bytes = tokio::io::copy(&mut reader, &mut remote)
        .await
        .map_err(|e| {
            SftpError::Transfer(format!(
                "Failed to upload {} to {}: {}",
                local_path.display(),
                remote_path,
                e
            ))
        })?;

    remote.shutdown().await.map_err(|e| {
        SftpError::Transfer(format!("Failed to close remote file {}: {}", remote_path, e))
    })?;

    progress.emit(ProgressEvent::Completed {
        direction: Direction::Upload,
        destination: remote_path.to_string(),
        bytes,
    });
    tracing::debug!("Uploaded {} ({} bytes)", remote_path, bytes);

    Ok(bytes)
}

/// Copy a local directory tree to `remote_dir`, depth first, in name order.
///
/// Remote directories are created as needed. Anything that is neither a
/// file nor a directory is skipped. The first failure aborts the copy.
pub async fn upload_dir<W: RemoteWrite>(
    fs: &W,
    local_dir: &Path,
    remote_dir: &str,
    progress: Progress<'_>,
) -> Result<TransferSummary, SftpError> {
    let read_error = |e: std::io::Error| {
        SftpError::LocalIo(format!(
            "Failed to read local directory {}: {}",
            local_dir.display(),
            e
        ))
    };

    let mut listing = tokio::fs::read_dir(local_dir).await.map_err(read_error)?;
    let mut entries = Vec::new();
    while let Some(entry) = listing.next_entry().await.map_err(read_error)? {
        entries.push(entry);
    }
    entries.sort_by_key(|entry| entry.file_name());

    fs.ensure_dir(remote_dir).await?;
    let mut summary = TransferSummary {
        directories: 1,
        ..Default::default()
    };

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().await.map_err(|e| {
            SftpError::LocalIo(format!("Failed to stat {}: {}", path.display(), e))
        })?;
        let target = join_remote(remote_dir, &entry.file_name().to_string_lossy());

        if file_type.is_dir() {
            let nested = Box::pin(upload_dir(fs, &path, &target, progress)).await?;
            summary.merge(nested);
        } else if file_type.is_file() {
            let bytes = upload_file(fs, &path, &target, progress).await?;
            summary.add_file(bytes);
        } else {
            tracing::debug!("Skipping {} (not a regular file)", path.display());
        }
    }

    Ok(summary)
}

/// Create a local directory and its parents with mode 0755
async fn create_local_dir(path: &Path) -> Result<(), SftpError> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        builder.mode(0o755);
    }
    builder.create(path).await.map_err(|e| {
        SftpError::LocalIo(format!(
            "Failed to create local directory {}: {}",
            path.display(),
            e
        ))
    })
}

/// Create or truncate a local file for writing
async fn create_local_file(path: &Path) -> Result<File, SftpError> {
    let mut options = OpenOptions::new();
    options.create(true).write(true).truncate(true);
    #[cfg(unix)]
    {
        options.mode(0o644);
    }
    options.open(path).await.map_err(|e| {
        SftpError::LocalIo(format!(
            "Failed to write local file {}: {}",
            path.display(),
            e
        ))
    })
}
