//! Builder for executing external tool commands.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output, untouched (may be binary).
    pub stdout: Vec<u8>,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

impl ToolOutput {
    /// Standard output decoded as lossy UTF-8.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }
}

/// Why a tool invocation did not produce usable output.
///
/// Callers map these onto their own [`rtt_core::Error`] variants, because a
/// spawn failure means different things for a probe and a transcode.
#[derive(Debug, thiserror::Error)]
pub enum ToolFailure {
    /// The process could not be started at all.
    #[error("{tool}: failed to spawn: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },

    /// The process ran and exited unsuccessfully.
    #[error("{tool}: exited with {}: {}", output.status, output.stderr.trim())]
    Exit { tool: String, output: ToolOutput },

    /// Waiting on the process failed.
    #[error("{tool}: I/O error waiting for process: {source}")]
    Wait {
        tool: String,
        source: std::io::Error,
    },

    /// The configured timeout elapsed; the child has been killed.
    #[error("{tool}: timed out after {after:?}")]
    TimedOut { tool: String, after: Duration },
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use rtt_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> Result<(), rtt_av::ToolFailure> {
/// let output = ToolCommand::new(PathBuf::from("ffprobe"))
///     .arg("-v").arg("error")
///     .arg("-of").arg("json")
///     .arg("-show_format")
///     .arg("/path/to/video.mkv")
///     .execute()
///     .await?;
/// println!("{}", output.stdout_text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    ///
    /// No timeout is applied unless [`ToolCommand::timeout`] is called.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set (or clear) the maximum execution time.
    pub fn timeout(&mut self, d: Option<Duration>) -> &mut Self {
        self.timeout = d;
        self
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command, capturing stdout and stderr in full.
    ///
    /// The child is killed if the returned future is dropped before it
    /// completes.
    ///
    /// # Errors
    ///
    /// - [`ToolFailure::Spawn`] if the process cannot be started.
    /// - [`ToolFailure::Exit`] if it exits with a non-zero status (the
    ///   captured output is attached).
    /// - [`ToolFailure::TimedOut`] if a timeout was set and elapsed.
    pub async fn execute(&self) -> Result<ToolOutput, ToolFailure> {
        let tool = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| ToolFailure::Spawn {
            tool: tool.clone(),
            source,
        })?;

        // With kill_on_drop the child is reaped when this future is dropped,
        // including when the timeout below cancels it.
        let waited = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ToolFailure::TimedOut {
                    tool: tool.clone(),
                    after: limit,
                })?,
            None => child.wait_with_output().await,
        };

        let output = waited.map_err(|source| ToolFailure::Wait {
            tool: tool.clone(),
            source,
        })?;

        let tool_output = ToolOutput {
            status: output.status,
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !tool_output.status.success() {
            return Err(ToolFailure::Exit {
                tool,
                output: tool_output,
            });
        }

        Ok(tool_output)
    }
}
