//! SSH connection, authentication and command execution

pub mod auth;
pub mod client;
pub mod command;
pub mod handler;

pub use client::{SshClient, SshConnection};
pub use command::CommandOutput;
