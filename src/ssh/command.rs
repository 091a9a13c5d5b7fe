//! One-shot remote command execution

use russh::ChannelMsg;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::SshError;

use super::client::SshConnection;

/// Everything a remote command sent back before its channel closed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_status: Option<u32>,
    pub exit_signal: Option<String>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.failure_reason().is_none()
    }

    /// Why the command counts as failed, if it does
    pub fn failure_reason(&self) -> Option<String> {
        if let Some(signal) = &self.exit_signal {
            return Some(format!("killed by signal {}", signal));
        }
        match self.exit_status {
            Some(0) => None,
            Some(code) => Some(format!("exit status {}", code)),
            None => Some("no exit status received".to_string()),
        }
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

impl SshConnection {
    /// Execute `command` on a fresh session channel and collect its output.
    ///
    /// A non-zero exit is not an error here; see [`SshConnection::run_command`].
    pub async fn exec(&self, command: &str) -> Result<CommandOutput, SshError> {
        let mut channel = self
            .handle()
            .channel_open_session()
            .await
            .map_err(|e| SshError::Channel(format!("Failed to open channel: {}", e)))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| SshError::Channel(format!("Failed to exec '{}': {}", command, e)))?;

        let mut output = CommandOutput::default();

        // Exit status may arrive after EOF, so read until the channel closes
        loop {
            match channel.wait().await {
                Some(ChannelMsg::Data { data }) => output.stdout.extend_from_slice(&data),
                Some(ChannelMsg::ExtendedData { data, ext }) => {
                    if ext == 1 {
                        output.stderr.extend_from_slice(&data);
                    }
                }
                Some(ChannelMsg::ExitStatus { exit_status }) => {
                    output.exit_status = Some(exit_status);
                }
                Some(ChannelMsg::ExitSignal { signal_name, .. }) => {
                    output.exit_signal = Some(format!("{:?}", signal_name));
                }
                Some(ChannelMsg::Close) | None => break,
                Some(_) => {}
            }
        }

        tracing::debug!(
            "'{}' finished: {} bytes stdout, {} bytes stderr, status {:?}",
            command,
            output.stdout.len(),
            output.stderr.len(),
            output.exit_status
        );

        Ok(output)
    }

    /// Run `command`, copy its stdout to `out`, and fail unless it exited 0.
    ///
    /// The captured stdout reaches `out` whether or not the command
    /// succeeded; the error carries it as well.
    pub async fn run_command<W>(&self, command: &str, out: &mut W) -> Result<CommandOutput, SshError>
    where
        W: AsyncWrite + Unpin,
    {
        let output = match self.exec(command).await {
            Ok(output) => output,
            Err(e) => {
                return Err(SshError::CommandFailed {
                    command: command.to_string(),
                    reason: e.to_string(),
                    output: Vec::new(),
                });
            }
        };
        finish_command(command, output, out).await
    }
}

/// Emit captured stdout, then turn a failed run into an error.
pub(crate) async fn finish_command<W>(
    command: &str,
    output: CommandOutput,
    out: &mut W,
) -> Result<CommandOutput, SshError>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(&output.stdout)
        .await
        .map_err(|e| SshError::Channel(format!("Failed to write command output: {}", e)))?;
    out.flush()
        .await
        .map_err(|e| SshError::Channel(format!("Failed to write command output: {}", e)))?;

    match output.failure_reason() {
        None => Ok(output),
        Some(reason) => {
            tracing::warn!("Command '{}' failed: {}", command, reason);
            Err(SshError::CommandFailed {
                command: command.to_string(),
                reason,
                output: output.stdout,
            })
        }
    }
}
