use clap::Parser;
use spa_serve::config::{Overrides, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;

/// Serve a built single-page application, falling back to index.html.
#[derive(Debug, Parser)]
#[command(name = "spa-serve", version)]
#[command(about = "Static SPA server with index.html fallback", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML); a missing file is not an error.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Directory holding the built site.
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Address to bind.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Number of runtime worker threads.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Verbose logging, including how each request path was resolved.
    #[arg(short, long)]
    pub debug: bool,

    /// Validate configuration and the site root, then exit.
    #[arg(long)]
    pub check: bool,

    /// Print the effective configuration as TOML, then exit.
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            root: self.root.clone(),
            workers: self.workers,
            debug: self.debug,
        }
    }
}
