//! prompt-gateway binary entry point.

use clap::Parser;
use prompt_gateway_cli::{Cli, CliError, Commands, handlers, logging};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.loglevel);

    if let Err(e) = run(cli.command).await {
        tracing::error!("{e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Serve {
            port,
            host,
            skip_model_pull,
        } => handlers::serve::execute(host, port, skip_model_pull).await,
        Commands::Check { retries, delay } => handlers::check::execute(retries, delay).await,
        Commands::Keygen { length, apps } => handlers::keygen::execute(length, &apps),
    }
}
