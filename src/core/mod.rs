pub mod layout;
pub mod manifest;
pub mod resolver;
pub mod workflow;

pub use crate::domain::model::{DownstreamMatch, ModuleManifest, TestOutcome, Toolchain};
pub use crate::domain::ports::{CommandOutput, CommandRunner, Invocation, OutputMode};
pub use crate::utils::error::Result;
