//! Minimal OpenSSH client config reader
//!
//! Only `Host`, `HostName`, `Port` and `User` are understood. Directives are
//! matched case-sensitively on the trimmed line and anything else is skipped.

use std::path::Path;

use crate::config::hosts::HostRecord;
use crate::config::paths::ssh_config_file;
use crate::error::ConfigError;

/// How record ids are assigned while scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdPolicy {
    /// A new `Host` takes the current counter, and the counter only moves
    /// forward on a `User` line that carries a value. Stanzas without a
    /// `User` line therefore share an id with the stanza that follows.
    #[default]
    AdvanceOnUser,
    /// Every emitted record gets the next id, 0..N-1 in file order.
    AdvanceOnHost,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    pub id_policy: IdPolicy,
}

enum Directive<'a> {
    Host(Option<&'a str>),
    HostName(Option<&'a str>),
    Port(Option<&'a str>),
    User(Option<&'a str>),
}

/// Read the hosts of a config file, reporting I/O errors to the caller.
pub fn read_hosts(path: &Path) -> Result<Vec<HostRecord>, ConfigError> {
    let content = std::fs::read(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(parse_ssh_config(&content))
}

/// Read the hosts of a config file.
///
/// An unreadable file is logged and produces an empty list.
pub fn get_hosts(path: &Path) -> Vec<HostRecord> {
    match read_hosts(path) {
        Ok(hosts) => {
            tracing::debug!("Read {} host(s) from {}", hosts.len(), path.display());
            hosts
        }
        Err(e) => {
            tracing::error!("{}", e);
            Vec::new()
        }
    }
}

/// Read the hosts of `~/.ssh/config`, or nothing when it does not exist.
pub fn load_hosts_from_ssh_config() -> Vec<HostRecord> {
    match ssh_config_file() {
        Some(path) if path.exists() => get_hosts(&path),
        Some(path) => {
            tracing::debug!("No ssh config at {}", path.display());
            Vec::new()
        }
        None => {
            tracing::warn!("Could not determine SSH config path");
            Vec::new()
        }
    }
}

pub fn parse_ssh_config(content: &[u8]) -> Vec<HostRecord> {
    parse_ssh_config_with(content, ParseOptions::default())
}

pub fn parse_ssh_config_with(content: &[u8], options: ParseOptions) -> Vec<HostRecord> {
    let mut hosts = Vec::new();
    let mut current = HostRecord::default();
    let mut user_counter: u32 = 0;
    let mut line = Vec::new();

    // Only newline-terminated lines are classified; trailing bytes after the
    // last '\n' are dropped.
    for &byte in content {
        if byte != b'\n' {
            line.push(byte);
            continue;
        }

        let decoded = String::from_utf8_lossy(&line).into_owned();
        match classify(decoded.trim()) {
            Some(Directive::Host(alias)) => {
                flush_record(&mut current, &mut hosts, options.id_policy);
                current = HostRecord {
                    id: user_counter,
                    ..Default::default()
                };
                if let Some(alias) = alias {
                    current.host = alias.to_string();
                }
            }
            Some(Directive::HostName(Some(value))) => current.hostname = value.to_string(),
            Some(Directive::Port(Some(value))) => current.port = value.to_string(),
            Some(Directive::User(Some(value))) => {
                current.user = value.to_string();
                user_counter += 1;
            }
            _ => {}
        }

        line.clear();
    }

    flush_record(&mut current, &mut hosts, options.id_policy);
    hosts
}

fn classify(line: &str) -> Option<Directive<'_>> {
    let value = || line.split_whitespace().nth(1);

    if line.starts_with("Host ") {
        Some(Directive::Host(value()))
    } else if line.starts_with("HostName ") {
        Some(Directive::HostName(value()))
    } else if line.starts_with("Port ") {
        Some(Directive::Port(value()))
    } else if line.starts_with("User ") {
        Some(Directive::User(value()))
    } else {
        None
    }
}

fn flush_record(current: &mut HostRecord, hosts: &mut Vec<HostRecord>, policy: IdPolicy) {
    if current.host.is_empty() {
        return;
    }

    let mut record = std::mem::take(current);
    if policy == IdPolicy::AdvanceOnHost {
        record.id = hosts.len() as u32;
    }
    hosts.push(record);
}
