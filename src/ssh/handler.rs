use std::future::Future;

use russh::client::Handler;
use russh::keys::{HashAlg, PublicKey};

use crate::error::SshError;
use crate::security_log;

/// SSH client handler
///
/// Host keys are not verified: whatever key the server presents is accepted
/// and recorded in the security log.
pub struct ClientHandler {
    host: String,
    port: u16,
}

impl ClientHandler {
    pub fn new(host: String, port: u16) -> Self {
        Self { host, port }
    }
}

impl Handler for ClientHandler {
    type Error = SshError;

    fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send {
        let fingerprint = server_public_key.fingerprint(HashAlg::Sha256).to_string();
        let key_type = server_public_key.algorithm().as_str().to_string();
        security_log::log_host_key_unverified(&self.host, self.port, &key_type, &fingerprint);

        async move { Ok(true) }
    }
}
