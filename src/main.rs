use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use tag_preprocess::{Args, Config, PreprocessError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::try_from(args) {
        Ok(config) => config,
        Err(err @ PreprocessError::MissingArguments) => {
            // Not treated as a failure: print usage and leave quietly
            println!("{}", err);
            println!("{}", Args::command().render_help());
            return Ok(ExitCode::from(err.exit_code()));
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Starting tag-preprocess v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!(?config, "resolved configuration");

    match tag_preprocess::run(&config) {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            tracing::error!("{}", err);
            Ok(ExitCode::from(err.exit_code()))
        }
    }
}
