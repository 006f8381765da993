//! yconf binary.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use yconf_cli::{Cli, Command, Overrides, Settings, run};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let overrides = Overrides {
        log_level: cli.log_level.clone(),
        output_format: cli.format,
        default_operation: match &cli.command {
            Command::Merge(args) => args.default_operation,
            Command::Validate(_) => None,
        },
    };
    let settings = Settings::load(cli.config.as_deref(), &overrides)?;

    // Initialize tracing; logs go to stderr so stdout stays machine readable
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(settings.log_level()))?,
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("yconf v{}", yconf_cli::version());

    match run(&cli, &settings) {
        Ok(output) => {
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        },
        Err(err) => {
            eprintln!("{}", err.report());
            Ok(ExitCode::from(err.exit_code()))
        },
    }
}
