use anyhow::Result;
use clap::{Parser, Subcommand};

use wayfinder_cli::commands::directions::{handle_directions, DirectionsArgs};
use wayfinder_cli::commands::fit::{handle_fit, FitArgs};
use wayfinder_cli::commands::landmarks::handle_landmarks;
use wayfinder_cli::output::OutputFormat;
use wayfinder_lib::logging::{init_logging, LoggingConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Walking directions and map regions around Perth")]
struct Cli {
    /// Output format.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in landmarks.
    Landmarks,
    /// Compute the map region that encloses a set of points.
    Fit(FitArgs),
    /// Request walking directions to a landmark.
    Directions(DirectionsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(&LoggingConfig::from_env());
    let cli = Cli::parse();

    match &cli.command {
        Command::Landmarks => handle_landmarks(cli.format),
        Command::Fit(args) => handle_fit(args, cli.format),
        Command::Directions(args) => handle_directions(args, cli.format).await,
    }
}
