use anyhow::Context;
use clap::Parser;
use spa_serve::{logger, server, AppState, Config};
use std::sync::Arc;

mod cli;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config, &cli.overrides())?;

    if cli.print_config {
        print!("{}", toml::to_string_pretty(&cfg)?);
        return Ok(());
    }

    logger::init(&cfg.logging)?;

    // Missing root or index.html is fatal: report once, never bind
    let state = match AppState::new(cfg) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!("{e}");
            return Err(e.into());
        }
    };

    if cli.check {
        tracing::info!(
            root = %state.resolver.root().display(),
            index = %state.resolver.index().display(),
            "Configuration OK"
        );
        return Ok(());
    }

    // Multi-threaded runtime, sized by `server.workers` when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = state.config.server.workers.filter(|w| *w > 0) {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(server::run(state))?;
    Ok(())
}
