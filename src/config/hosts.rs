use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Port used when a host entry has no `Port` line
pub const DEFAULT_SSH_PORT: u16 = 22;

/// One `Host` stanza read from an ssh_config file
///
/// Values are kept exactly as they appeared in the file; `port` in
/// particular stays a string until [`HostRecord::port_number`] is asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    pub id: u32,
    /// Alias given on the `Host` line
    pub host: String,
    /// Address given on the `HostName` line
    pub hostname: String,
    pub port: String,
    pub user: String,
}

impl HostRecord {
    /// Numeric port, defaulting to 22 when the entry had none.
    pub fn port_number(&self) -> Result<u16, ConfigError> {
        if self.port.is_empty() {
            return Ok(DEFAULT_SSH_PORT);
        }
        self.port.parse().map_err(|_| ConfigError::InvalidPort {
            host: self.host.clone(),
            port: self.port.clone(),
        })
    }

    /// Host to dial. Falls back to the alias like `ssh` does.
    pub fn dial_host(&self) -> &str {
        if self.hostname.is_empty() {
            &self.host
        } else {
            &self.hostname
        }
    }

    /// `host:port` string for the dial target
    pub fn address(&self) -> Result<String, ConfigError> {
        Ok(format!("{}:{}", self.dial_host(), self.port_number()?))
    }
}

/// Find the first record with the given alias
pub fn find_host<'a>(records: &'a [HostRecord], alias: &str) -> Result<&'a HostRecord, ConfigError> {
    records
        .iter()
        .find(|record| record.host == alias)
        .ok_or_else(|| ConfigError::HostNotFound(alias.to_string()))
}
