//! Subprocess adapter.
//!
//! Arguments are passed to the program as a literal vector; nothing goes
//! through a shell.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::error::{PipelineError, PipelineResult};

/// Captured output of a successful invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// A program plus its argument vector.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Append `prefix` immediately followed by a path, e.g. `png:<dst>`.
    pub fn prefixed_path(self, prefix: &str, path: &Path) -> Self {
        let mut arg = OsString::from(prefix);
        arg.push(path.as_os_str());
        self.arg(arg)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arg_list(&self) -> &[OsString] {
        &self.args
    }

    /// The command line as it would be typed, for error messages and logs.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion.
    ///
    /// A nonzero exit becomes `ExternalOperation` with the command line and
    /// stderr (stdout if stderr is empty). The child is killed if the
    /// returned future is dropped.
    pub async fn run(&self) -> PipelineResult<CommandOutput> {
        let command_line = self.command_line();
        tracing::debug!("Running: {}", command_line);

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| PipelineError::ExternalOperation {
                command: command_line.clone(),
                output: format!("failed to start: {e}"),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let diagnostic = if stderr.trim().is_empty() {
                stdout
            } else {
                stderr
            };
            return Err(PipelineError::ExternalOperation {
                command: command_line,
                output: format!("{} ({})", diagnostic.trim_end(), output.status),
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}
