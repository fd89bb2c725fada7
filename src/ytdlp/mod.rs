//! yt-dlp side of the tool: one-shot runs and the retry loop around them

pub mod retry;
pub mod runner;

#[cfg(all(test, unix))]
pub(crate) mod testing;

pub use retry::{ExecuteOutcome, Orchestrator, ATTEMPT_MULTIPLIER};
pub use runner::{is_rejection, CommandRunner, RunVerdict, RunnerConfig};
