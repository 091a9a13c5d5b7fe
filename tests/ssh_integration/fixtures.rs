//! SSH test server fixtures

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::{sleep, timeout};

use simplyssh::config::HostRecord;
use simplyssh::ssh::{SshClient, SshConnection};

// Tests share one remote account, so they run one at a time
static TEST_LOCK: Mutex<()> = Mutex::const_new(());

pub async fn acquire_test_lock() -> MutexGuard<'static, ()> {
    TEST_LOCK.lock().await
}

/// Configuration for the test SSH server, read from the environment
#[derive(Debug, Clone)]
pub struct TestSshServer {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub private_key_path: PathBuf,
}

impl TestSshServer {
    pub fn from_env() -> Option<Self> {
        let host = env::var("SIMPLYSSH_TEST_HOST").ok()?;
        let port = env::var("SIMPLYSSH_TEST_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(22);
        let username = env::var("SIMPLYSSH_TEST_USER")
            .or_else(|_| env::var("USER"))
            .unwrap_or_else(|_| "root".to_string());
        let private_key_path = env::var("SIMPLYSSH_TEST_KEY")
            .map(|p| simplyssh::config::paths::expand_tilde(Path::new(&p)))
            .unwrap_or_else(|_| {
                simplyssh::config::paths::default_identity_files()
                    .into_iter()
                    .next()
                    .unwrap_or_default()
            });

        Some(Self {
            host,
            port,
            username,
            private_key_path,
        })
    }

    /// A host record as `get_hosts` would produce it for this server
    pub fn host_record(&self, alias: &str) -> HostRecord {
        HostRecord {
            id: 0,
            host: alias.to_string(),
            hostname: self.host.clone(),
            port: self.port.to_string(),
            user: self.username.clone(),
        }
    }
}

pub fn is_server_configured() -> bool {
    TestSshServer::from_env().is_some()
}

/// Wait for SSH server to be ready
pub async fn wait_for_ssh_ready(host: &str, port: u16) -> Result<(), String> {
    let addr = format!("{}:{}", host, port);
    let max_attempts = 30;

    for attempt in 1..=max_attempts {
        match timeout(Duration::from_secs(2), TcpStream::connect(&addr)).await {
            Ok(Ok(_)) => return Ok(()),
            _ => {
                if attempt == max_attempts {
                    return Err(format!(
                        "SSH server not ready after {} attempts",
                        max_attempts
                    ));
                }
                sleep(Duration::from_millis(200)).await;
            }
        }
    }

    Err("SSH server not ready".to_string())
}

/// Connected test environment
pub struct SshTestEnvironment {
    pub server: TestSshServer,
    pub client: SshClient,
}

impl SshTestEnvironment {
    pub async fn new() -> Result<Self, String> {
        let server = TestSshServer::from_env().ok_or("SIMPLYSSH_TEST_HOST not set")?;
        wait_for_ssh_ready(&server.host, server.port).await?;

        Ok(Self {
            server,
            client: SshClient::default(),
        })
    }

    pub async fn connect(&self) -> SshConnection {
        self.client
            .connect(
                &self.server.host,
                self.server.port,
                &self.server.username,
                Some(&self.server.private_key_path),
                None,
            )
            .await
            .expect("Failed to connect to test server")
    }

    /// Create a fresh remote scratch directory and return its path
    pub async fn remote_scratch_dir(&self, connection: &SshConnection) -> String {
        let output = connection
            .exec("mktemp -d")
            .await
            .expect("Failed to run mktemp");
        assert!(output.success(), "mktemp failed: {:?}", output);
        output.stdout_lossy().trim().to_string()
    }
}

/// Macro to skip tests when no test server is configured
#[macro_export]
macro_rules! skip_if_no_server {
    () => {
        if !super::fixtures::is_server_configured() {
            eprintln!("Skipping test: SIMPLYSSH_TEST_HOST not set");
            return;
        }
    };
}
