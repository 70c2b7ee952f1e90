//! Host process wrappers for E2E runs

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use super::{E2EError, E2EResult};

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// Execute a shell command line in `cwd` and return its trimmed stdout.
///
/// A non-zero exit status is reported as [`E2EError::CommandFailed`] with the
/// captured stderr. The shell runs in its own process group, and the whole
/// group is killed if `limit` expires.
pub async fn exec_shell(command_line: &str, cwd: &Path, limit: Duration) -> E2EResult<String> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(command_line)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    tracing::info!("Running `{}` in {}", command_line, cwd.display());

    let child = cmd
        .spawn()
        .map_err(|e| E2EError::Exec(format!("failed to spawn `{}`: {}", command_line, e)))?;
    let pid = child.id();

    let output = match timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(E2EError::Exec(format!(
                "failed to wait for `{}`: {}",
                command_line, e
            )));
        }
        Err(_) => {
            if let Some(pid) = pid {
                kill_process_group(pid);
            }
            return Err(E2EError::Timeout(format!(
                "`{}` to finish within {:?}",
                command_line, limit
            )));
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(E2EError::CommandFailed {
            command: command_line.to_string(),
            code: output.status.code(),
            stderr,
        });
    }

    tracing::debug!("`{}` output: {}", command_line, stdout);
    Ok(stdout)
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    if let Err(e) = killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL) {
        tracing::warn!("Failed to kill process group {}: {}", pgid, e);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {}

/// Runs command lines from a fixed working directory with a shared timeout
#[derive(Debug, Clone)]
pub struct CommandRunner {
    cwd: PathBuf,
    limit: Duration,
}

impl CommandRunner {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            limit: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.limit = limit;
        self
    }

    pub async fn run(&self, command_line: &str) -> E2EResult<String> {
        exec_shell(command_line, &self.cwd, self.limit).await
    }
}
