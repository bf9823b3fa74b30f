use anyhow::Context;
use clap::Parser;
use downstream::app::commands;
use downstream::config::cli::Command;
use downstream::utils::{logger, validation::Validate};
use downstream::{
    BuildLayout, CliConfig, DownstreamError, DownstreamResolver, SystemRunner, ToolConfig,
    WorkflowDriver,
};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<DownstreamError>() {
                Some(err) => {
                    tracing::error!("❌ {} (Category: {:?})", err, err.category());
                    eprintln!("❌ {}", err);
                    eprintln!("💡 {}", err.recovery_suggestion());
                }
                None => {
                    tracing::error!("❌ {:#}", e);
                    eprintln!("❌ {:#}", e);
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn resolve_working_dir(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let dir = match explicit {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get working directory")?,
    };
    dir.canonicalize()
        .with_context(|| format!("Failed to resolve working directory {}", dir.display()))
}

fn run(cli: CliConfig) -> anyhow::Result<()> {
    let working_dir = resolve_working_dir(cli.working_dir)?;

    let config = ToolConfig::discover(&working_dir, cli.config.as_deref())?;
    config.validate()?;

    let runner = SystemRunner::new();
    let tools = config.toolchain();
    let resolver = DownstreamResolver::new(runner, tools.git.clone()).with_policy(config.scan_policy());
    let (module, matches) = commands::discover(&resolver, &working_dir)?;

    let driver = WorkflowDriver::new(
        runner,
        tools,
        BuildLayout::new(&working_dir, &config.build_dir),
    );

    match cli.command {
        Command::List { prod, json } => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            if json {
                commands::list_json(&mut out, &matches, prod)?;
            } else {
                commands::list(&mut out, &module.name, &matches, prod)?;
            }
        }
        Command::Build(args) => {
            let selected = commands::select(&matches, &args.modules);
            let report = commands::build_all(&driver, &selected, &working_dir, args.keep_going)?;
            tracing::info!("✅ Built {} downstream module(s)", report.built.len());
            if !report.is_success() {
                let names: Vec<&str> = report.failed.iter().map(|(name, _)| name.as_str()).collect();
                anyhow::bail!("Failed to build: {}", names.join(", "));
            }
        }
        Command::Test(args) => {
            let selected = commands::select(&matches, &args.modules);
            let report = commands::test_all(&driver, &selected, cli.verbose)?;
            println!(
                "{} passed, {} failed",
                report.passed.len(),
                report.failed.len()
            );
            for name in &report.failed {
                println!("  failed: {}", name);
            }
        }
    }

    Ok(())
}
