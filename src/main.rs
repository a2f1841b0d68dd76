// CLI binary entry point for tagscan

mod cli;

use clap::Parser;
use cli::Config;
use std::process;

fn main() {
    let config = Config::parse();
    init_logging(&config);

    if let Err(e) = cli::commands::run(&config) {
        eprintln!("✗ {e:#}");
        process::exit(1);
    }
}

/// `RUST_LOG` takes precedence over the verbosity flags
fn init_logging(config: &Config) {
    let default_level = if config.verbose {
        "debug"
    } else if config.quiet {
        "error"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
