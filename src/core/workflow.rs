use crate::core::layout::BuildLayout;
use crate::domain::model::{DownstreamMatch, TestOutcome, Toolchain};
use crate::domain::ports::{CommandRunner, Invocation, OutputMode};
use crate::utils::error::{DownstreamError, Result};
use std::io::ErrorKind;
use std::path::Path;

/// git prints this when the clone target is already there.
const ALREADY_EXISTS: &str = "already exists";

/// Clones, installs and tests downstream modules inside a [`BuildLayout`].
pub struct WorkflowDriver<R: CommandRunner> {
    runner: R,
    tools: Toolchain,
    layout: BuildLayout,
}

impl<R: CommandRunner> WorkflowDriver<R> {
    pub fn new(runner: R, tools: Toolchain, layout: BuildLayout) -> Self {
        Self {
            runner,
            tools,
            layout,
        }
    }

    pub fn layout(&self) -> &BuildLayout {
        &self.layout
    }

    pub fn ensure_build_root(&self) -> Result<()> {
        match std::fs::create_dir(self.layout.root()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(source) => Err(DownstreamError::BuildRoot {
                path: self.layout.root().to_path_buf(),
                source,
            }),
        }
    }

    pub fn clone_into(&self, origin_url: &str) -> Result<()> {
        let inv = Invocation::new(self.tools.git.as_str(), self.layout.root())
            .args(["clone", origin_url]);
        let out = self.runner.run(&inv)?;

        if out.success {
            return Ok(());
        }
        if out.stderr.contains(ALREADY_EXISTS) {
            tracing::debug!("{} already cloned, reusing checkout", origin_url);
            return Ok(());
        }
        Err(DownstreamError::Clone {
            url: origin_url.to_string(),
            stderr: out.stderr,
        })
    }

    /// `npm install <spec>` in `checkout_dir`, or a plain `npm install` when `spec` is empty.
    pub fn install_dependency(&self, checkout_dir: &Path, spec: &str) -> Result<()> {
        let mut inv = Invocation::new(self.tools.package_manager.as_str(), checkout_dir).arg("install");
        if !spec.is_empty() {
            inv = inv.arg(spec);
        }

        let out = self.runner.run(&inv)?;
        if !out.success {
            return Err(DownstreamError::Install {
                dir: checkout_dir.to_path_buf(),
                stderr: out.stderr,
            });
        }
        Ok(())
    }

    /// Clone the downstream, install the module at `working_dir` into it, then
    /// install the rest of its dependencies. Stops at the first failing step.
    pub fn build(&self, ds: &DownstreamMatch, working_dir: &Path) -> Result<()> {
        let checkout_dir = self.layout.checkout_dir(&ds.origin_url)?;
        self.ensure_build_root()?;

        tracing::info!("Cloning {} into {}...", ds.origin_url, self.layout.root().display());
        self.clone_into(&ds.origin_url)?;

        tracing::info!("Installing {} into {}...", working_dir.display(), ds.name);
        self.install_dependency(&checkout_dir, &working_dir.to_string_lossy())?;
        self.install_dependency(&checkout_dir, "")?;

        tracing::info!("Built {}", ds.name);
        Ok(())
    }

    /// Run the test command in the downstream's checkout. A failing run is
    /// logged and reported as [`TestOutcome::Failed`], not as an error.
    pub fn test(&self, ds: &DownstreamMatch, verbose: bool) -> Result<TestOutcome> {
        tracing::info!("Running tests for {}...", ds.name);
        let checkout_dir = self.layout.checkout_dir(&ds.origin_url)?;

        let Some((program, args)) = self.tools.test_command.split_first() else {
            return Err(DownstreamError::ConfigError {
                message: "test command is empty".to_string(),
            });
        };
        let mode = if verbose {
            OutputMode::Inherit
        } else {
            OutputMode::Discard
        };
        let inv = Invocation::new(program.as_str(), &checkout_dir)
            .args(args.iter().cloned())
            .output(mode);

        let outcome = match self.runner.run(&inv) {
            Ok(out) if out.success => TestOutcome::Passed,
            Ok(out) => {
                tracing::warn!("Tests failed for {}: exit code {:?}", ds.name, out.exit_code);
                TestOutcome::Failed {
                    exit_code: out.exit_code,
                }
            }
            Err(e) => {
                tracing::warn!("Tests failed for {}: {}", ds.name, e);
                TestOutcome::Failed { exit_code: None }
            }
        };

        if outcome.passed() {
            tracing::info!("Tests pass for {}!", ds.name);
        }
        Ok(outcome)
    }
}
