mod app;
mod assets;
mod compositor;
mod config;
mod face;
mod input;
mod interaction;
mod layout;
mod model;
mod motion;
mod render;
mod sim;
mod sprites;

use anyhow::{Context, Result};
use clap::Parser;
use config::{load_config, project_paths, save_config_atomic, Cli};
use std::{fs::OpenOptions, path::Path};

fn init_logging(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    // stdout belongs to the face; logs go to a file
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = project_paths()?;

    let log_path = cli.log_file.clone().unwrap_or(paths.log_path);
    init_logging(&log_path)?;

    let config_path = cli.config.clone().unwrap_or(paths.config_path);
    let mut cfg = load_config(&config_path);

    if cli.init_config {
        save_config_atomic(&config_path, &cfg)?;
        println!("wrote {}", config_path.display());
        return Ok(());
    }

    cfg.apply_cli(&cli);
    cfg.validate()
        .with_context(|| format!("invalid configuration in {}", config_path.display()))?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        return Ok(());
    }

    app::run(cfg, cli.fps)
}
