use clap::Parser;
use tracing_subscriber::EnvFilter;

use sentinel::cli::{Cli, Commands};
use sentinel::output;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "sentinel=debug" } else { "sentinel=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let (verbose, quiet) = (cli.verbose, cli.quiet);

    match &cli.command {
        Commands::Scan(cmd) => {
            let settings = cli.settings()?;
            cmd.execute(&settings, verbose, quiet).await?;
        }
        Commands::History(cmd) => cmd.execute(quiet)?,
        Commands::Export(cmd) => cmd.execute(quiet)?,
        Commands::Threats(cmd) => cmd.execute(quiet)?,
    }
    Ok(())
}
