// CLI module for tagscan
//
// Only compiled into the binary. Library errors are wrapped with anyhow
// context here.

pub mod commands;
pub mod config;
pub mod output;

pub use config::{Commands, Config, OutputFormat};
pub use output::OutputFormatter;
