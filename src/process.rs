//! Helpers for running the external utilities this tool drives
//! (`smbclient`, `gio`).

use std::io;
use std::process::{Command, Stdio};

use tracing::trace;

/// Captured result of a finished external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the command exited with status zero
    pub success: bool,
    /// Exit code, when the process exited normally
    pub code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Standard error with surrounding whitespace removed, or a description
    /// of the exit status when nothing was written.
    pub fn failure_reason(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        match self.code {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Run `program` with `args` to completion, capturing its output.
///
/// Standard input is closed so utilities that would prompt (for a password,
/// for instance) fail instead of hanging. No timeout is applied.
pub fn run(program: &str, args: &[&str]) -> io::Result<CommandOutput> {
    trace!(program, ?args, "Running command");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;

    Ok(CommandOutput {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Check if a binary exists in PATH
pub fn binary_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
