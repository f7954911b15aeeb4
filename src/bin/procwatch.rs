//! procwatch - terminal process and memory dashboard.
//!
//! Run: `procwatch`

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use procwatch::{debug, App, Config};

/// Terminal process and memory dashboard
#[derive(Parser, Debug)]
#[command(name = "procwatch")]
#[command(version)]
#[command(about = "Live process table with memory summary and SIGTERM", long_about = None)]
struct Cli {
    /// Refresh interval in milliseconds (default 3000)
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging (also PROCWATCH_DEBUG=1)
    #[arg(long)]
    debug: bool,

    /// Debug log file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Use j/k for navigation; kill becomes K
    #[arg(long)]
    vim_keys: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug || debug::requested_by_env() {
        let path = cli.log_file.clone().unwrap_or_else(|| std::env::temp_dir().join("procwatch.log"));
        debug::enable_to_file(&path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
    }

    let config = load_config(&cli)?;
    procwatch::info!("main", "starting with {:?}", config.global);

    let mut app = App::new(config);
    app.run()?;

    Ok(())
}

/// Defaults, then file, then environment, then flags.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        // An explicit path must exist and be valid.
        Some(path) => Config::load(path)?,
        None => Config::default_path().map(Config::load_or_default).unwrap_or_default(),
    };

    config.apply_env(|key| std::env::var(key).ok());

    if let Some(ms) = cli.refresh {
        config.set_update_ms(ms);
    }
    if cli.vim_keys {
        config.global.vim_keys = true;
    }

    config.validate()?;
    Ok(config)
}
