// src/main.rs — AeroForge entry point

use std::path::Path;

use clap::Parser;

use aeroforge::cli::{run, Cli};
use aeroforge::infra::config::Config;
use aeroforge::infra::logger;

fn main() {
    let cli = Cli::parse();

    // AEROFORGE_LOG / RUST_LOG still take precedence
    logger::init_logging(if cli.verbose { "debug" } else { "warn" });

    let code = match execute(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            run::EXIT_FAILED
        }
    };
    std::process::exit(code);
}

fn execute(cli: &Cli) -> anyhow::Result<i32> {
    let mut config = match cli.config {
        Some(ref path) => Config::load_from(Path::new(path))?,
        None => Config::load()?,
    };
    if let Some(n) = cli.max_iterations {
        config.refinement.max_iterations = n;
    }
    if cli.no_report {
        config.report.enabled = false;
    }
    config.validate()?;

    run::run_pipeline(&cli.prompt_text(), &config, cli.quiet)
}
