use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use rendas::config::{Cli, Command};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> rendas::Result<()> {
    match cli.command {
        Command::Serve(args) => {
            let config = args.into_config()?;
            rendas::api::run_http_server(config).await
        }
        Command::Report(args) => {
            let raw = tokio::fs::read_to_string(&args.file).await?;
            let report = rendas::api::report_from_json(&raw)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
