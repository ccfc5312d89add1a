use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::interfaces::cli::{
    describe_address, list_families, resolve_config, run_batch, Cli, Command,
};

/// `RUST_LOG` when set, `fallback` otherwise.
fn init_logging(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Run(args) => resolve_config(&args).and_then(|config| {
            init_logging(&config.log_level);
            run_batch(config, args.json)
        }),
        Command::Address { text } => {
            init_logging("warn");
            Ok(describe_address(&text))
        }
        Command::Families => Ok(list_families()),
    };

    match outcome {
        Ok(report) => {
            println!("{}", report.trim_end());
            ExitCode::SUCCESS
        }
        Err(err) => {
            init_logging("info");
            error!(error = %err, "Run failed");
            ExitCode::FAILURE
        }
    }
}
