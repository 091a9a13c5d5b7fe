use std::path::{Path, PathBuf};
use std::sync::Arc;

use russh::keys::{HashAlg, PrivateKeyWithHashAlg};
use secrecy::{ExposeSecret, SecretString};

use crate::config::paths;
use crate::error::SshError;

/// Pick the key file for a connection attempt.
///
/// An explicit path wins, then the configured identity file, then the first
/// default identity (`~/.ssh/id_ed25519`, `id_rsa`, `id_ecdsa`) that exists.
pub fn resolve_key_path(
    explicit: Option<&Path>,
    configured: Option<&Path>,
) -> Result<PathBuf, SshError> {
    let path = explicit
        .or(configured)
        .map(Path::to_path_buf)
        .or_else(find_default_key)
        .ok_or_else(|| SshError::KeyFile("No SSH key found".to_string()))?;

    Ok(paths::expand_tilde(&path))
}

fn find_default_key() -> Option<PathBuf> {
    paths::default_identity_files()
        .into_iter()
        .find(|path| path.exists())
}

/// Load an SSH private key from file
pub fn load_key_file(
    path: &Path,
    passphrase: Option<&SecretString>,
) -> Result<PrivateKeyWithHashAlg, SshError> {
    tracing::debug!("Loading private key {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| {
        SshError::KeyFile(format!("Cannot read key file {}: {}", path.display(), e))
    })?;

    // Check if this is actually a public key (common mistake)
    let first_line = content.lines().next().unwrap_or("");
    if first_line.starts_with("ssh-") || first_line.starts_with("ecdsa-") {
        return Err(SshError::KeyFile(format!(
            "File {} contains a PUBLIC key, not a private key",
            path.display()
        )));
    }

    if !first_line.starts_with("-----BEGIN") {
        return Err(SshError::KeyFile(format!(
            "File {} does not appear to be a valid SSH private key",
            path.display()
        )));
    }

    let passphrase = passphrase.map(|p| p.expose_secret());
    let key = russh::keys::decode_secret_key(&content, passphrase).map_err(|e| {
        let normalized = e.to_string().to_lowercase();
        let is_passphrase_error = normalized.contains("encrypted")
            || normalized.contains("passphrase")
            || normalized.contains("cryptographic");
        if is_passphrase_error {
            if passphrase.is_some() {
                SshError::KeyFilePassphraseInvalid(path.to_path_buf())
            } else {
                SshError::KeyFilePassphraseRequired(path.to_path_buf())
            }
        } else {
            SshError::KeyFile(format!("Failed to load key {}: {}", path.display(), e))
        }
    })?;

    // Only RSA needs an explicit signature hash
    let hash_alg = if key.algorithm().is_rsa() {
        Some(HashAlg::Sha512)
    } else {
        None
    };

    Ok(PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg))
}
