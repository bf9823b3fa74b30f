use crate::core::layout::DEFAULT_BUILD_DIR;
use crate::core::resolver::ScanPolicy;
use crate::domain::model::Toolchain;
use crate::utils::error::{DownstreamError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = ".downstream.toml";

/// Optional per-module settings, read from `.downstream.toml`.
///
/// ```toml
/// build_dir = ".downstream"
/// strict_scan = true
///
/// [tools]
/// git = "git"
/// package_manager = "npm"
/// test_command = ["make", "test"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub build_dir: String,
    pub strict_scan: bool,
    pub tools: Toolchain,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            build_dir: DEFAULT_BUILD_DIR.to_string(),
            strict_scan: true,
            tools: Toolchain::default(),
        }
    }
}

impl ToolConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DownstreamError::ConfigError {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Explicit path if given, else `<working_dir>/.downstream.toml` if it exists, else defaults.
    pub fn discover(working_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let default_path = working_dir.join(CONFIG_FILE);
        if default_path.is_file() {
            tracing::debug!("Loading config from {}", default_path.display());
            return Self::from_file(default_path);
        }
        Ok(Self::default())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DownstreamError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DownstreamError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn scan_policy(&self) -> ScanPolicy {
        if self.strict_scan {
            ScanPolicy::FailFast
        } else {
            ScanPolicy::SkipInvalid
        }
    }

    pub fn toolchain(&self) -> Toolchain {
        self.tools.clone()
    }
}

impl Validate for ToolConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_dir_name("build_dir", &self.build_dir)?;
        validation::validate_non_empty_string("tools.git", &self.tools.git)?;
        validation::validate_non_empty_string("tools.package_manager", &self.tools.package_manager)?;
        validation::validate_command("tools.test_command", &self.tools.test_command)?;
        Ok(())
    }
}
