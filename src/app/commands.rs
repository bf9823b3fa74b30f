use crate::core::layout::derive_checkout_dir_name;
use crate::core::manifest::{load_manifest, looks_like_module_directory, manifest_path};
use crate::core::resolver::DownstreamResolver;
use crate::core::workflow::WorkflowDriver;
use crate::domain::model::{DownstreamMatch, ModuleManifest, TestOutcome};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{DownstreamError, Result};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Loads the manifest of the module the tool runs from.
pub fn open_module(working_dir: &Path) -> Result<ModuleManifest> {
    if !looks_like_module_directory(working_dir) {
        return Err(DownstreamError::NotAModule {
            path: working_dir.to_path_buf(),
        });
    }
    load_manifest(manifest_path(working_dir))
}

/// Siblings of the working directory live in its parent.
pub fn base_dir(working_dir: &Path) -> PathBuf {
    working_dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| working_dir.join(".."))
}

/// The current module plus every sibling that depends on it.
pub fn discover<R: CommandRunner>(
    resolver: &DownstreamResolver<R>,
    working_dir: &Path,
) -> Result<(ModuleManifest, Vec<DownstreamMatch>)> {
    let module = open_module(working_dir)?;
    let matches = resolver.resolve(base_dir(working_dir), &module.name)?;
    tracing::debug!("Found {} downstream(s) of {}", matches.len(), module.name);
    Ok((module, matches))
}

pub fn format_match(ds: &DownstreamMatch, target: &str) -> String {
    format!(
        "{}@{} depends on {} of {}",
        ds.name, ds.version, ds.depends_on, target
    )
}

pub fn list<W: Write>(
    out: &mut W,
    target: &str,
    matches: &[DownstreamMatch],
    prod_only: bool,
) -> std::io::Result<()> {
    for ds in matches {
        if prod_only && ds.dev_dependency {
            continue;
        }
        writeln!(out, "{}", format_match(ds, target))?;
    }
    Ok(())
}

/// Same selection as [`list`], as a pretty-printed JSON array.
pub fn list_json<W: Write>(
    out: &mut W,
    matches: &[DownstreamMatch],
    prod_only: bool,
) -> std::io::Result<()> {
    let shown: Vec<&DownstreamMatch> = matches
        .iter()
        .filter(|ds| !(prod_only && ds.dev_dependency))
        .collect();
    serde_json::to_writer_pretty(&mut *out, &shown)?;
    writeln!(out)
}

/// Matches named in `modules`, or all of them when `modules` is empty.
pub fn select<'a>(matches: &'a [DownstreamMatch], modules: &[String]) -> Vec<&'a DownstreamMatch> {
    matches
        .iter()
        .filter(|ds| modules.is_empty() || modules.contains(&ds.name))
        .collect()
}

/// Two downstreams cloning into the same directory would overwrite each other.
fn warn_on_checkout_collisions(selected: &[&DownstreamMatch]) {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for ds in selected {
        let Ok(dir_name) = derive_checkout_dir_name(&ds.origin_url) else {
            continue;
        };
        if let Some(previous) = seen.insert(dir_name.clone(), &ds.name) {
            tracing::warn!(
                "{} and {} both check out into '{}'",
                previous,
                ds.name,
                dir_name
            );
        }
    }
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub built: Vec<String>,
    pub failed: Vec<(String, DownstreamError)>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Builds each selected downstream in order. Without `keep_going` the first
/// failure is returned and nothing after it is attempted.
pub fn build_all<R: CommandRunner>(
    driver: &WorkflowDriver<R>,
    selected: &[&DownstreamMatch],
    working_dir: &Path,
    keep_going: bool,
) -> Result<BuildReport> {
    warn_on_checkout_collisions(selected);

    let mut report = BuildReport::default();
    for ds in selected {
        match driver.build(ds, working_dir) {
            Ok(()) => report.built.push(ds.name.clone()),
            Err(e) if keep_going => {
                tracing::error!("Failed to build {}: {}", ds.name, e);
                report.failed.push((ds.name.clone(), e));
            }
            Err(e) => {
                tracing::error!("Failed to build {}: {}", ds.name, e);
                return Err(e);
            }
        }
    }
    Ok(report)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct TestReport {
    pub passed: Vec<String>,
    pub failed: Vec<String>,
}

/// Tests each selected downstream. Failing tests are recorded, never returned as errors.
pub fn test_all<R: CommandRunner>(
    driver: &WorkflowDriver<R>,
    selected: &[&DownstreamMatch],
    verbose: bool,
) -> Result<TestReport> {
    let mut report = TestReport::default();
    for ds in selected {
        match driver.test(ds, verbose)? {
            TestOutcome::Passed => report.passed.push(ds.name.clone()),
            TestOutcome::Failed { .. } => report.failed.push(ds.name.clone()),
        }
    }
    Ok(report)
}
