//! simplyssh: small SSH and SFTP helpers
//!
//! Read host aliases from an OpenSSH client config, connect with a private
//! key, run remote commands and download files or whole directory trees
//! with progress reporting.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use simplyssh::config::{find_host, load_hosts_from_ssh_config};
//! use simplyssh::sftp::{ConsoleProgress, Progress, SftpSession};
//! use simplyssh::ssh::SshClient;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let hosts = load_hosts_from_ssh_config();
//! let host = find_host(&hosts, "backup")?;
//!
//! let client = SshClient::default();
//! let connection = client.connect_host(host, None, None).await?;
//! connection.run_command("uptime", &mut tokio::io::stdout()).await?;
//!
//! let sftp = SftpSession::open(&connection).await?;
//! let console = ConsoleProgress::stdout();
//! sftp.download_dir("/var/backups", Path::new("backups"), Progress::new(&console))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod security_log;
pub mod sftp;
pub mod ssh;

pub use config::HostRecord;
pub use error::{ConfigError, SftpError, SshError};
