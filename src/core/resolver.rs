use crate::core::manifest::{load_manifest, looks_like_module_directory, manifest_path};
use crate::domain::model::DownstreamMatch;
use crate::domain::ports::{CommandRunner, Invocation};
use crate::utils::error::{DownstreamError, Result};
use std::path::{Path, PathBuf};

/// What to do with a sibling whose manifest cannot be loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanPolicy {
    /// Abort the whole scan.
    #[default]
    FailFast,
    /// Log a warning and leave that sibling out.
    SkipInvalid,
}

/// Finds sibling modules that declare a dependency on a target module.
pub struct DownstreamResolver<R: CommandRunner> {
    runner: R,
    git: String,
    policy: ScanPolicy,
}

impl<R: CommandRunner> DownstreamResolver<R> {
    pub fn new(runner: R, git: impl Into<String>) -> Self {
        Self {
            runner,
            git: git.into(),
            policy: ScanPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ScanPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn resolve<P: AsRef<Path>>(&self, base_dir: P, target: &str) -> Result<Vec<DownstreamMatch>> {
        let base_dir = base_dir.as_ref();
        tracing::debug!("Scanning {} for dependents of {}", base_dir.display(), target);

        let mut matches = Vec::new();
        for dir in list_subdirectories(base_dir)? {
            if !looks_like_module_directory(&dir) {
                tracing::debug!("Skipping {}: no package.json", dir.display());
                continue;
            }

            let manifest = match load_manifest(manifest_path(&dir)) {
                Ok(manifest) => manifest,
                Err(e) if self.policy == ScanPolicy::SkipInvalid => {
                    tracing::warn!("Skipping {}: {}", dir.display(), e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let Some(dep) = manifest.dependency_on(target) else {
                continue;
            };

            let origin_url = self.origin_fetch_url(&dir)?;
            tracing::debug!(
                "{}@{} depends on {} of {} (dev: {})",
                manifest.name,
                manifest.version,
                dep.range,
                target,
                dep.dev
            );

            matches.push(DownstreamMatch {
                name: manifest.name,
                version: manifest.version,
                depends_on: dep.range,
                dev_dependency: dep.dev,
                origin_url,
            });
        }

        Ok(matches)
    }

    fn origin_fetch_url(&self, dir: &Path) -> Result<String> {
        let inv = Invocation::new(self.git.as_str(), dir).args(["remote", "-v"]);
        let out = self.runner.run(&inv)?;
        if !out.success {
            return Err(DownstreamError::RemoteQuery {
                dir: dir.to_path_buf(),
                stderr: out.stderr.trim().to_string(),
            });
        }

        parse_origin_fetch(&out.stdout).ok_or_else(|| DownstreamError::OriginNotFound {
            dir: dir.to_path_buf(),
        })
    }
}

/// Picks the URL of the `origin` fetch remote out of `git remote -v` output.
///
/// Lines look like `origin\thttps://host/org/repo.git (fetch)`; anything
/// else is ignored.
pub fn parse_origin_fetch(remotes: &str) -> Option<String> {
    remotes.lines().find_map(|line| {
        let (name, rest) = line.split_once('\t')?;
        if name != "origin" || !rest.contains("(fetch)") {
            return None;
        }
        rest.split(' ')
            .next()
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    })
}

/// Immediate subdirectories of `base_dir`, in file-name order.
pub fn list_subdirectories(base_dir: &Path) -> Result<Vec<PathBuf>> {
    let list_error = |source| DownstreamError::ListDirectory {
        path: base_dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(base_dir).map_err(list_error)? {
        let entry = entry.map_err(list_error)?;
        // symlinks are not followed
        if entry.file_type().map_err(list_error)?.is_dir() {
            entries.push(entry);
        }
    }
    entries.sort_by_key(|entry| entry.file_name());

    Ok(entries.into_iter().map(|entry| entry.path()).collect())
}
