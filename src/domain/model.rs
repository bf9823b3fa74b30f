use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Contents of a module's `package.json` that discovery cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModuleManifest {
    pub name: String,
    pub version: String,
    pub dependencies: HashMap<String, String>,
    #[serde(rename = "devDependencies")]
    pub dev_dependencies: HashMap<String, String>,
}

/// A declared dependency on the target module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredDependency {
    pub range: String,
    pub dev: bool,
}

impl ModuleManifest {
    /// Looks `module_name` up in `dependencies`, then `devDependencies`.
    pub fn dependency_on(&self, module_name: &str) -> Option<DeclaredDependency> {
        if let Some(range) = self.dependencies.get(module_name) {
            return Some(DeclaredDependency {
                range: range.clone(),
                dev: false,
            });
        }

        self.dev_dependencies
            .get(module_name)
            .map(|range| DeclaredDependency {
                range: range.clone(),
                dev: true,
            })
    }
}

/// A sibling module that depends on the target module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownstreamMatch {
    pub name: String,
    pub version: String,
    pub depends_on: String,
    pub dev_dependency: bool,
    pub origin_url: String,
}

/// Outcome of running a downstream's test command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    Failed { exit_code: Option<i32> },
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, TestOutcome::Passed)
    }
}

/// Names of the external executables the workflow invokes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Toolchain {
    pub git: String,
    pub package_manager: String,
    pub test_command: Vec<String>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            package_manager: "npm".to_string(),
            test_command: vec!["make".to_string(), "test".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(deps: &[(&str, &str)], dev_deps: &[(&str, &str)]) -> ModuleManifest {
        ModuleManifest {
            name: "app".to_string(),
            version: "1.0.0".to_string(),
            dependencies: deps
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            dev_dependencies: dev_deps
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_production_dependency_wins_over_dev() {
        let m = manifest(&[("foo", "^1.0.0")], &[("foo", "^2.0.0")]);
        let dep = m.dependency_on("foo").unwrap();
        assert_eq!(dep.range, "^1.0.0");
        assert!(!dep.dev);
    }

    #[test]
    fn test_dev_dependency_is_flagged() {
        let m = manifest(&[], &[("foo", "~0.3.1")]);
        let dep = m.dependency_on("foo").unwrap();
        assert_eq!(dep.range, "~0.3.1");
        assert!(dep.dev);
    }

    #[test]
    fn test_name_must_match_exactly() {
        let m = manifest(&[("foo-bar", "1.0.0")], &[("Foo", "1.0.0")]);
        assert!(m.dependency_on("foo").is_none());
    }

    #[test]
    fn test_manifest_tolerates_missing_and_unknown_fields() {
        let m: ModuleManifest =
            serde_json::from_str(r#"{"name": "lib", "scripts": {"test": "make test"}}"#).unwrap();
        assert_eq!(m.name, "lib");
        assert!(m.version.is_empty());
        assert!(m.dependencies.is_empty());
        assert!(m.dev_dependencies.is_empty());
    }
}
