//! Toyhost - headless player for canvas toys
//!
//! # Commands
//!
//! - `toyhost run <manifest>` - Load a toy, run frames, optionally screenshot
//! - `toyhost cache install <manifest>` - Populate the toy's offline cache
//! - `toyhost cache status <manifest>` - Show which assets are cached
//! - `toyhost call <wasm> <export> [ARGS]` - Call one export and print results
//! - `toyhost inspect <wasm>` - List a module's imports and exports
//!
//! # Usage
//!
//! ```bash
//! # Run the grid fill toy for 120 frames, clicking once, and save a frame
//! toyhost run toys/gridfill.toml --frames 120 --click 200,150 --screenshot out.png
//!
//! # Drive the maze with keys
//! toyhost run toys/blockmaze.toml --key ArrowRight --key ArrowDown
//!
//! # Install the offline cache, then run without network
//! toyhost cache install toys/gridfill.toml --base-url https://example.org
//! toyhost run toys/gridfill.toml --offline
//! ```

mod cache;
mod call;
mod inspect;
mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Toyhost - headless player for canvas toys
#[derive(Parser)]
#[command(name = "toyhost")]
#[command(about = "Run WebAssembly canvas toys headlessly")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a toy and run its render loop
    Run(run::RunArgs),

    /// Manage a toy's offline cache
    #[command(subcommand)]
    Cache(cache::CacheCommand),

    /// Call a single export with arguments parsed per its signature
    Call(call::CallArgs),

    /// List a module's imports and exports
    Inspect(inspect::InspectArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run::execute(args),
        Commands::Cache(command) => cache::execute(command),
        Commands::Call(args) => call::execute(args),
        Commands::Inspect(args) => inspect::execute(args),
    }
}
