pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::process::SystemRunner;
pub use config::ToolConfig;
pub use core::layout::{derive_checkout_dir_name, BuildLayout};
pub use core::manifest::{load_manifest, looks_like_module_directory};
pub use core::resolver::{DownstreamResolver, ScanPolicy};
pub use core::workflow::WorkflowDriver;
pub use domain::model::{DownstreamMatch, ModuleManifest, TestOutcome, Toolchain};
pub use domain::ports::{CommandOutput, CommandRunner, Invocation, OutputMode};
pub use utils::error::{DownstreamError, Result};
