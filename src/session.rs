//! Remote session hand-off over SSH.
//!
//! Once provisioning completes, the `up` command confirms the remote host is
//! reachable with the provisioned key by running a short probe command over
//! SSH and returning its output. Command execution sits behind
//! [`CommandRunner`] so tests can script outcomes without spawning processes.

use std::ffi::OsString;
use std::process::Command;

use camino::Utf8Path;
use thiserror::Error;

use crate::config::SessionConfig;

/// Probe command executed on the remote host once the session is open.
const SERVER_INFO_COMMAND: &str = "uname -a";

/// Errors surfaced while opening the remote session.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SessionError {
    /// Raised when a command cannot be spawned.
    #[error("failed to spawn {program}: {message}")]
    Spawn {
        /// Command that failed to start.
        program: String,
        /// Operating system error string.
        message: String,
    },
    /// Raised when `ssh` completes with a non-zero exit code.
    #[error("{program} exited with status {status_text}: {stderr}")]
    CommandFailure {
        /// Command name used for the attempted connection.
        program: String,
        /// Exit status as reported by the OS.
        status: Option<i32>,
        /// Human readable representation of the exit status.
        status_text: String,
        /// Stderr captured from the process.
        stderr: String,
    },
}

/// Result of running an external command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandOutput {
    /// Exit code reported by the process, if available.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Returns `true` when the exit code equals zero.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Abstraction over command execution to support fakes in tests.
pub trait CommandRunner {
    /// Runs `program` with the given arguments, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Spawn`] if the command cannot be started.
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, SessionError>;
}

/// Real command runner that shells out to the host operating system.
#[derive(Clone, Debug, Default)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, SessionError> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|err| SessionError::Spawn {
                program: program.to_owned(),
                message: err.to_string(),
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Opens SSH sessions against the configured remote host.
#[derive(Clone, Debug)]
pub struct SessionClient<R: CommandRunner> {
    config: SessionConfig,
    runner: R,
}

impl SessionClient<ProcessCommandRunner> {
    /// Convenience constructor that wires the real process runner.
    #[must_use]
    pub const fn with_process_runner(config: SessionConfig) -> Self {
        Self::new(config, ProcessCommandRunner)
    }
}

impl<R: CommandRunner> SessionClient<R> {
    /// Creates a client from the given configuration and runner.
    #[must_use]
    pub const fn new(config: SessionConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Connects to the remote host using `key_path` for authentication and
    /// returns the output of a short system probe.
    ///
    /// Batch mode is forced so a missing or rejected key fails immediately
    /// instead of falling back to a password prompt.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Spawn`] if `ssh` cannot be started, or
    /// [`SessionError::CommandFailure`] if it exits with a non-zero status.
    pub fn server_info(&self, key_path: &Utf8Path) -> Result<String, SessionError> {
        let args = self.build_ssh_args(key_path);
        let output = self.runner.run(&self.config.ssh_bin, &args)?;
        if output.is_success() {
            return Ok(output.stdout);
        }

        let status_text = output
            .code
            .map_or_else(|| String::from("unknown"), |code| code.to_string());
        Err(SessionError::CommandFailure {
            program: self.config.ssh_bin.clone(),
            status: output.code,
            status_text,
            stderr: output.stderr,
        })
    }

    fn build_ssh_args(&self, key_path: &Utf8Path) -> Vec<OsString> {
        vec![
            OsString::from("-p"),
            OsString::from(self.config.port.to_string()),
            OsString::from("-i"),
            OsString::from(key_path.as_str()),
            OsString::from("-o"),
            OsString::from("BatchMode=yes"),
            OsString::from(format!("{}@{}", self.config.user, self.config.host)),
            OsString::from(SERVER_INFO_COMMAND),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedRunner;

    fn config() -> SessionConfig {
        SessionConfig {
            host: String::from("203.0.113.7"),
            user: String::from("deploy"),
            port: 2222,
            key_file: String::from("~/.ssh/id_ed25519"),
            ssh_bin: String::from("ssh"),
        }
    }

    #[test]
    fn server_info_returns_probe_output() {
        let runner = ScriptedRunner::new();
        runner.push_output(Some(0), "Linux berth 6.8.0-55-generic x86_64 GNU/Linux\n", "");
        let client = SessionClient::new(config(), runner.clone());

        let info = client
            .server_info(Utf8Path::new("/home/deploy/.ssh/id_ed25519"))
            .unwrap_or_else(|err| panic!("server info: {err}"));

        assert_eq!(info, "Linux berth 6.8.0-55-generic x86_64 GNU/Linux\n");
        let invocations = runner.invocations();
        assert_eq!(invocations.len(), 1);
        let Some(invocation) = invocations.first() else {
            panic!("invocation should be recorded");
        };
        assert_eq!(
            invocation.command_string(),
            "ssh -p 2222 -i /home/deploy/.ssh/id_ed25519 -o BatchMode=yes \
             deploy@203.0.113.7 uname -a"
        );
    }

    #[test]
    fn failing_exit_code_reports_command_failure() {
        let runner = ScriptedRunner::new();
        runner.push_output(Some(255), "", "Permission denied (publickey).");
        let client = SessionClient::new(config(), runner);

        let err = client
            .server_info(Utf8Path::new("/home/deploy/.ssh/id_ed25519"))
            .expect_err("connection should fail");

        assert_eq!(
            err,
            SessionError::CommandFailure {
                program: String::from("ssh"),
                status: Some(255),
                status_text: String::from("255"),
                stderr: String::from("Permission denied (publickey)."),
            }
        );
    }

    #[test]
    fn signal_termination_reports_unknown_status() {
        let runner = ScriptedRunner::new();
        runner.push_output(None, "", "");
        let client = SessionClient::new(config(), runner);

        let err = client
            .server_info(Utf8Path::new("/home/deploy/.ssh/id_ed25519"))
            .expect_err("connection should fail");

        let SessionError::CommandFailure { status_text, .. } = err else {
            panic!("expected CommandFailure error");
        };
        assert_eq!(status_text, "unknown");
    }
}
