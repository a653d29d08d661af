// File: src/bin/tui.rs
use anyhow::Result;
use std::fs;
use taskflow::app::AppContext;
use taskflow::config::Config;
use tracing_subscriber::EnvFilter;

// The TUI owns the terminal, so logs go to a file in the data dir.
fn init_logging() {
    let Some(dir) = Config::data_dir() else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("taskflow.log"))
    else {
        return;
    };

    let filter = EnvFilter::try_from_env("TASKFLOW_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = Config::load()?;
    if Config::path().is_some_and(|p| !p.exists()) {
        // First run: write a template the user can fill in.
        config.save()?;
    }

    let ctx = match AppContext::init(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    taskflow::tui::run(ctx).await
}
