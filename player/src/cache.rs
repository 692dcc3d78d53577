//! Cache commands - install and inspect a toy's offline cache

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use toyhost_core::ToyManifest;
use toyhost_core::cache::{self, DirNetwork, HttpNetwork, Network, OfflineCache};
use toyhost_core::config::CacheConfig;

#[derive(Subcommand)]
pub enum CacheCommand {
    /// Fetch every listed asset into the cache (all or nothing)
    Install(InstallArgs),

    /// Show which listed assets are cached
    Status(StatusArgs),
}

/// Arguments for `cache install`
#[derive(Args)]
pub struct InstallArgs {
    /// Path to the toy manifest
    pub manifest: PathBuf,

    /// Origin to fetch assets from (overrides `cache.base_url`)
    #[arg(long, conflicts_with = "from_dir")]
    pub base_url: Option<String>,

    /// Serve assets from a local directory instead of the network
    #[arg(long)]
    pub from_dir: Option<PathBuf>,

    /// Cache root (defaults to the platform data directory)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

/// Arguments for `cache status`
#[derive(Args)]
pub struct StatusArgs {
    /// Path to the toy manifest
    pub manifest: PathBuf,

    /// Cache root (defaults to the platform data directory)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

pub fn execute(command: CacheCommand) -> Result<()> {
    match command {
        CacheCommand::Install(args) => install(args),
        CacheCommand::Status(args) => status(args),
    }
}

fn open_cache(
    manifest_path: &Path,
    cache_dir: Option<&Path>,
) -> Result<(ToyManifest, CacheConfig, OfflineCache)> {
    let manifest = ToyManifest::load(manifest_path)
        .with_context(|| format!("Failed to load {}", manifest_path.display()))?;
    let Some(config) = manifest.cache.clone() else {
        bail!("'{}' has no [cache] section", manifest.name);
    };

    let root = match cache_dir {
        Some(dir) => dir.to_path_buf(),
        None => cache::default_root().context("Could not determine cache directory")?,
    };
    let cache = OfflineCache::open(&root, &config.name);
    Ok((manifest, config, cache))
}

fn install(args: InstallArgs) -> Result<()> {
    let (manifest, config, cache) = open_cache(&args.manifest, args.cache_dir.as_deref())?;

    let network: Box<dyn Network> = match (&args.from_dir, &args.base_url, &config.base_url) {
        (Some(dir), _, _) => Box::new(DirNetwork::new(dir)),
        (None, Some(url), _) | (None, None, Some(url)) => Box::new(HttpNetwork::new(url.as_str())),
        (None, None, None) => bail!("no asset origin: pass --base-url or --from-dir"),
    };

    let count = cache
        .install(&config.assets, network.as_ref())
        .with_context(|| format!("Failed to install cache '{}'", config.name))?;
    println!(
        "Installed {} assets for '{}' into {}",
        count,
        manifest.name,
        cache.dir().display()
    );
    Ok(())
}

fn status(args: StatusArgs) -> Result<()> {
    let (_, config, cache) = open_cache(&args.manifest, args.cache_dir.as_deref())?;

    let mut cached = 0;
    for asset in &config.assets {
        let present = cache.contains(asset);
        if present {
            cached += 1;
        }
        println!("{} {}", if present { "cached " } else { "missing" }, asset);
    }
    println!(
        "{}/{} assets cached in '{}'",
        cached,
        config.assets.len(),
        config.name
    );
    Ok(())
}
