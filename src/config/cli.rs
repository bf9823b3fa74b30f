use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "downstream")]
#[command(about = "Build and test the sibling modules that depend on this one")]
pub struct CliConfig {
    /// Module directory to run from (defaults to the current directory)
    #[arg(short = 'C', long = "dir", global = true)]
    pub working_dir: Option<PathBuf>,

    /// Path to a TOML config file (defaults to <dir>/.downstream.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging and show test output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List downstream modules
    List {
        /// Show only prod dependencies
        #[arg(short, long)]
        prod: bool,

        /// Print the matches as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Build downstream modules; builds all of them when none are named
    Build(BuildArgs),
    /// Test downstream modules; tests all of them when none are named
    Test(TestArgs),
}

#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// Only build these modules
    pub modules: Vec<String>,

    /// Continue with the remaining modules after a build failure
    #[arg(long)]
    pub keep_going: bool,
}

#[derive(Debug, Clone, Args)]
pub struct TestArgs {
    /// Only test these modules
    pub modules: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_prod() {
        let cli = CliConfig::try_parse_from(["downstream", "list", "-p"]).unwrap();
        assert!(matches!(cli.command, Command::List { prod: true, json: false }));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_list_json() {
        let cli = CliConfig::try_parse_from(["downstream", "list", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::List { prod: false, json: true }));
    }

    #[test]
    fn test_parse_build_with_modules() {
        let cli =
            CliConfig::try_parse_from(["downstream", "build", "app", "web", "--keep-going"]).unwrap();
        match cli.command {
            Command::Build(args) => {
                assert_eq!(args.modules, vec!["app", "web"]);
                assert!(args.keep_going);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli =
            CliConfig::try_parse_from(["downstream", "test", "-v", "-C", "/code/lib", "app"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.working_dir, Some(PathBuf::from("/code/lib")));
        match cli.command {
            Command::Test(args) => assert_eq!(args.modules, vec!["app"]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(CliConfig::try_parse_from(["downstream"]).is_err());
    }
}
