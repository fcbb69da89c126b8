//! CLI command handlers, one file per command.

mod completions;
mod man;
mod once;
mod watch;

pub use completions::run_completions;
pub use man::run_man;
pub use once::run_once;
pub use watch::run_watch;
