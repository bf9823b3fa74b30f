use crate::domain::ports::{CommandOutput, CommandRunner, Invocation, OutputMode};
use crate::utils::error::{DownstreamError, Result};
use std::process::{Command, Stdio};

/// [`CommandRunner`] backed by real subprocesses.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        tracing::debug!(
            "Running `{}` in {}",
            invocation.display(),
            invocation.cwd.display()
        );

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null());

        let spawn_error = |source| DownstreamError::Spawn {
            program: invocation.program.clone(),
            source,
        };

        let output = match invocation.output {
            OutputMode::Capture => {
                let out = cmd.output().map_err(spawn_error)?;
                CommandOutput {
                    success: out.status.success(),
                    exit_code: out.status.code(),
                    stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
                }
            }
            OutputMode::Inherit | OutputMode::Discard => {
                let stdio = || {
                    if invocation.output == OutputMode::Inherit {
                        Stdio::inherit()
                    } else {
                        Stdio::null()
                    }
                };
                let status = cmd
                    .stdout(stdio())
                    .stderr(stdio())
                    .status()
                    .map_err(spawn_error)?;
                CommandOutput {
                    success: status.success(),
                    exit_code: status.code(),
                    ..CommandOutput::default()
                }
            }
        };

        tracing::debug!(
            "`{}` exited with {:?}",
            invocation.display(),
            output.exit_code
        );
        Ok(output)
    }
}
