//! SFTP file transfers with progress reporting

pub mod progress;
pub mod session;
pub mod transfer;
pub mod types;

pub use progress::{
    ConsoleProgress, DEFAULT_PROGRESS_INTERVAL, Direction, NoProgress, Progress, ProgressEvent,
    ProgressReader, ProgressSink,
};
pub use session::SftpSession;
pub use transfer::{RemoteFs, RemoteWrite, download_dir, download_file, upload_dir, upload_file};
pub use types::{RemoteEntry, TransferSummary};
