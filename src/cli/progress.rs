// src/cli/progress.rs — Terminal progress renderer

use crate::core::types::PipelineEvent;

/// Build a progress callback that writes formatted lines to stderr.
///
/// Stdout is reserved for the final state. Returns a closure suitable for
/// `Pipeline::with_progress()`.
pub fn terminal_progress() -> impl Fn(PipelineEvent) + Send + 'static {
    move |event| eprintln!("{}", render(&event))
}

/// One line per event.
pub fn render(event: &PipelineEvent) -> String {
    match event {
        PipelineEvent::StageStarted { stage } => format!("[{stage}] running..."),
        PipelineEvent::StageCompleted { stage, next_agent } => {
            format!("[{stage}] done -> {next_agent}")
        }
        PipelineEvent::AttemptStarted {
            attempt,
            max_attempts,
        } => format!("[attempt {attempt}/{max_attempts}] proposing..."),
        PipelineEvent::AttemptRejected { attempt, phases } => {
            if phases.is_empty() {
                format!("[attempt {attempt}] rejected (no stable phases)")
            } else {
                format!("[attempt {attempt}] rejected ({})", phases.join(", "))
            }
        }
        PipelineEvent::Accepted { attempt } => format!("[attempt {attempt}] accepted"),
        PipelineEvent::Exhausted { attempts } => {
            format!("[loop] gave up after {attempts} attempt(s)")
        }
        PipelineEvent::Halted { stage, reason } => format!("[halt] {stage}: {reason}"),
    }
}
