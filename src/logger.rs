use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

use crate::config::LogConfig;

fn builder(config: &LogConfig) -> Result<Builder> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(config.level.as_str()));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{:<5}] {} - {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    match &config.file {
        Some(path) => {
            builder.target(Target::Pipe(Box::new(open_log_file(path)?)));
        }
        None => {
            builder.target(Target::Stderr);
        }
    }
    Ok(builder)
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    // Create the parent dir if needed.
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log dir {}", dir.display()))?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Install the global logger. `RUST_LOG` wins over the configured level.
pub fn init_logger(config: &LogConfig) -> Result<()> {
    builder(config)?
        .try_init()
        .context("a logger is already installed")
}
