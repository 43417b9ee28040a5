mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::{DiscoverArgs, ShowArgs, discover, show};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "podnet")]
#[command(about = "Discover pod network state for a VM and cache it for guest configuration")]
struct Cli {
    /// Cache directory shared with the DHCP responder and domain builder
    #[arg(long, global = true, default_value = "/var/run/podnet")]
    cache_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one discovery pass and persist the results
    Discover(DiscoverArgs),
    /// Print the cached records of one VM interface
    Show(ShowArgs),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Discover(args) => discover(&cli.cache_dir, args)?,
        Commands::Show(args) => show(&cli.cache_dir, args)?,
    }

    Ok(())
}
