// src/cli/mod.rs — CLI definition (clap derive)

pub mod progress;
pub mod run;

use clap::Parser;

pub const DEFAULT_PROMPT: &str = "I need a high-temperature lightweight aerospace alloy.";

#[derive(Parser, Debug)]
#[command(
    name = "aeroforge",
    about = "Alloy discovery pipeline: research, refine, simulate",
    version
)]
pub struct Cli {
    /// Design request (words are joined with spaces)
    #[arg(trailing_var_arg = true)]
    pub prompt: Vec<String>,

    /// Config file path
    #[arg(long)]
    pub config: Option<String>,

    /// Max proposal/evaluation rounds (overrides config)
    #[arg(short = 'n', long)]
    pub max_iterations: Option<u32>,

    /// Suppress progress output (only emit the final state)
    #[arg(long)]
    pub quiet: bool,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Skip writing report artifacts
    #[arg(long)]
    pub no_report: bool,
}

impl Cli {
    /// The prompt as given, or the default request when none was.
    pub fn prompt_text(&self) -> String {
        if self.prompt.is_empty() {
            DEFAULT_PROMPT.to_string()
        } else {
            self.prompt.join(" ")
        }
    }
}
