//! Storyreel CLI binary.
//!
//! Loads configuration, sets up logging, and runs one story-to-video pipeline.

use clap::Parser;
use storyreel::StoryreelConfig;
use storyreel::telemetry::init_console_telemetry;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, generate};

    // Secrets may live in .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_console_telemetry(cli.verbose)?;

    let config = StoryreelConfig::load_with(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate(args) => {
            let artifact = generate(args, &config).await?;
            println!("{}", artifact.display());
        }

        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
