pub mod commands;
pub mod handlers;

pub use commands::{CliArgs, Commands, CoverageArgs, OutputFormatArg, ProcessArgs};
pub use handlers::{handle_coverage, handle_process};
