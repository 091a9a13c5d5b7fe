//! Security event logging for audit trails.
//!
//! Structured events for authentication attempts, host key acceptance and
//! SFTP session setup. All events use `target: "security"` so they can be
//! filtered on their own:
//!
//! ```bash
//! RUST_LOG=security=info my-tool
//! ```

use tracing::{info, warn};

/// Log an SSH authentication attempt.
pub fn log_auth_attempt(host: &str, port: u16, username: &str, method: &str) {
    info!(
        target: "security",
        event = "auth_attempt",
        host = %host,
        port = port,
        username = %username,
        method = %method,
        "SSH authentication attempt"
    );
}

/// Log a successful SSH authentication.
pub fn log_auth_success(host: &str, port: u16, username: &str, method: &str) {
    info!(
        target: "security",
        event = "auth_success",
        host = %host,
        port = port,
        username = %username,
        method = %method,
        "SSH authentication succeeded"
    );
}

/// Log a failed SSH authentication attempt.
pub fn log_auth_failure(host: &str, port: u16, username: &str, method: &str, reason: &str) {
    warn!(
        target: "security",
        event = "auth_failure",
        host = %host,
        port = port,
        username = %username,
        method = %method,
        reason = %reason,
        "SSH authentication failed"
    );
}

/// Log a server host key that was accepted without verification.
pub fn log_host_key_unverified(host: &str, port: u16, key_type: &str, fingerprint: &str) {
    warn!(
        target: "security",
        event = "host_key_unverified",
        host = %host,
        port = port,
        key_type = %key_type,
        fingerprint = %fingerprint,
        "Accepting host key without verification"
    );
}

/// Log an SFTP session establishment.
pub fn log_sftp_connect(host: &str, port: u16) {
    info!(
        target: "security",
        event = "sftp_connect",
        host = %host,
        port = port,
        "SFTP session established"
    );
}

/// Log an SSH disconnect.
pub fn log_ssh_disconnect(host: &str, port: u16) {
    info!(
        target: "security",
        event = "ssh_disconnect",
        host = %host,
        port = port,
        "SSH connection closed"
    );
}
