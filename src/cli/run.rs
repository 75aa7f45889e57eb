// src/cli/run.rs — Default command: run the pipeline once

use crate::backend::fallback::WithFallback;
use crate::backend::report::FileReporter;
use crate::backend::Reporter;
use crate::core::orchestrator::{Pipeline, PipelineFailure};
use crate::core::state::SessionState;
use crate::infra::config::Config;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_EXHAUSTED: i32 = 2;

/// Run the built-in pipeline for `prompt` and return the process exit code.
///
/// The final state goes to stdout whenever one exists, including after a
/// halt. Progress, logs and the terminal message go to stderr.
pub fn run_pipeline(prompt: &str, config: &Config, quiet: bool) -> anyhow::Result<i32> {
    let mut pipeline = Pipeline::from_config(config)?;
    if !quiet {
        pipeline = pipeline.with_progress(super::progress::terminal_progress());
    }

    match pipeline.run(prompt) {
        Ok(state) => {
            print_state(&state)?;
            if config.report.enabled {
                write_reports(&state, config);
            }
            Ok(EXIT_OK)
        }
        Err(failure) => {
            if let Some(ref state) = failure.state {
                print_state(state)?;
            }
            eprintln!("error: {}", failure.user_message());
            Ok(exit_code(&failure))
        }
    }
}

pub fn exit_code(failure: &PipelineFailure) -> i32 {
    if failure.is_loop_exhausted() {
        EXIT_EXHAUSTED
    } else {
        EXIT_FAILED
    }
}

fn print_state(state: &SessionState) -> anyhow::Result<()> {
    println!("{}", state.to_json_pretty()?);
    Ok(())
}

/// Fire-and-forget: a reporter failure is logged and never changes the outcome.
fn write_reports(state: &SessionState, config: &Config) {
    let reporter = WithFallback::new(FileReporter::new(&config.report.output_dir));
    if let Ok(paths) = reporter.report(state) {
        for path in paths {
            tracing::info!(path = %path.display(), "Report written");
        }
    }
}
