use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use russh::Disconnect;
use russh::client::{self, Config, Handle};
use russh::keys::PrivateKeyWithHashAlg;
use secrecy::SecretString;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::{ClientSettings, HostRecord};
use crate::error::SshError;
use crate::security_log;

use super::auth;
use super::handler::ClientHandler;

/// SSH client for establishing connections
pub struct SshClient {
    config: Arc<Config>,
    settings: ClientSettings,
}

impl SshClient {
    pub fn new(settings: ClientSettings) -> Self {
        let config = Config {
            inactivity_timeout: settings.inactivity_timeout(),
            keepalive_interval: settings.keepalive_interval(),
            keepalive_max: 3,
            ..Default::default()
        };

        Self {
            config: Arc::new(config),
            settings,
        }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Connect to `hostname:port` and authenticate as `username` with a
    /// private key.
    ///
    /// The key is read from `key_path`, or from the configured identity file,
    /// or from the first default identity found under `~/.ssh`.
    pub async fn connect(
        &self,
        hostname: &str,
        port: u16,
        username: &str,
        key_path: Option<&Path>,
        passphrase: Option<&SecretString>,
    ) -> Result<SshConnection, SshError> {
        let key_path = auth::resolve_key_path(key_path, self.settings.identity_file.as_deref())?;
        let key = auth::load_key_file(&key_path, passphrase)?;

        let addr = format!("{}:{}", hostname, port);
        let limit = self.settings.connection_timeout();

        let stream = bounded(limit, &addr, async {
            TcpStream::connect(&addr)
                .await
                .map_err(|e| SshError::ConnectionFailed {
                    host: hostname.to_string(),
                    port,
                    reason: e.to_string(),
                })
        })
        .await?;

        let handle = bounded(
            limit,
            &addr,
            self.establish_session(hostname, port, username, stream, key),
        )
        .await?;

        tracing::info!("Connection ok to {}@{}", username, addr);

        Ok(SshConnection {
            handle,
            host: hostname.to_string(),
            port,
            username: username.to_string(),
        })
    }

    /// Connect to a host record read from an ssh_config file
    pub async fn connect_host(
        &self,
        host: &HostRecord,
        key_path: Option<&Path>,
        passphrase: Option<&SecretString>,
    ) -> Result<SshConnection, SshError> {
        let port = host.port_number()?;
        self.connect(host.dial_host(), port, &host.user, key_path, passphrase)
            .await
    }

    async fn establish_session(
        &self,
        hostname: &str,
        port: u16,
        username: &str,
        stream: TcpStream,
        key: PrivateKeyWithHashAlg,
    ) -> Result<Handle<ClientHandler>, SshError> {
        let handler = ClientHandler::new(hostname.to_string(), port);

        let mut handle = client::connect_stream(self.config.clone(), stream, handler)
            .await
            .map_err(|e| SshError::ConnectionFailed {
                host: hostname.to_string(),
                port,
                reason: e.to_string(),
            })?;

        authenticate(&mut handle, username, key, hostname, port).await?;
        Ok(handle)
    }
}

impl Default for SshClient {
    fn default() -> Self {
        Self::new(ClientSettings::default())
    }
}

async fn authenticate(
    handle: &mut Handle<ClientHandler>,
    username: &str,
    key: PrivateKeyWithHashAlg,
    hostname: &str,
    port: u16,
) -> Result<(), SshError> {
    let method_name = "publickey";
    security_log::log_auth_attempt(hostname, port, username, method_name);

    let auth_result = match handle.authenticate_publickey(username, key).await {
        Ok(result) => result,
        Err(e) => {
            let reason = e.to_string();
            security_log::log_auth_failure(hostname, port, username, method_name, &reason);
            return Err(SshError::AuthenticationFailed(reason));
        }
    };

    if !auth_result.success() {
        let reason = "Authentication rejected by server";
        security_log::log_auth_failure(hostname, port, username, method_name, reason);
        return Err(SshError::AuthenticationFailed(reason.to_string()));
    }

    security_log::log_auth_success(hostname, port, username, method_name);
    Ok(())
}

/// Run `fut`, giving up after `limit` when one is set
async fn bounded<T, F>(limit: Option<Duration>, addr: &str, fut: F) -> Result<T, SshError>
where
    F: Future<Output = Result<T, SshError>>,
{
    match limit {
        Some(limit) => timeout(limit, fut)
            .await
            .map_err(|_| SshError::Timeout(addr.to_string()))?,
        None => fut.await,
    }
}

/// An authenticated SSH connection
pub struct SshConnection {
    handle: Handle<ClientHandler>,
    host: String,
    port: u16,
    username: String,
}

impl std::fmt::Debug for SshConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshConnection")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl SshConnection {
    pub fn handle(&self) -> &Handle<ClientHandler> {
        &self.handle
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub async fn disconnect(self) -> Result<(), SshError> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(|e| SshError::Channel(e.to_string()))?;
        security_log::log_ssh_disconnect(&self.host, self.port);
        Ok(())
    }
}
