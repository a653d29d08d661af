// File: ./src/app.rs
// Process-wide context: built once at startup, torn down on exit.
use crate::client::SheetsClient;
use crate::clock::Clock;
use crate::config::Config;
use crate::dispatch::{Action, Dispatcher};
use crate::model::today_string;
use crate::sound::{Silent, SoundPlayer, TerminalBell};
use crate::sync::SyncEngine;
use anyhow::{Result, anyhow};
use std::time::Duration;

pub struct AppContext {
    pub config: Config,
    pub dispatcher: Dispatcher<SheetsClient>,
    pub clock: Clock,
}

impl AppContext {
    /// Connects the store client and starts the clock. Needs a tokio runtime.
    pub fn init(config: Config) -> Result<Self> {
        if !config.is_complete() {
            return Err(anyhow!(
                "spreadsheet_id and access_token must be set (config: {})",
                Config::path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            ));
        }
        let client = SheetsClient::new(&config).map_err(|e| anyhow!(e))?;
        let sound: Box<dyn SoundPlayer> = if config.sound {
            Box::new(TerminalBell)
        } else {
            Box::new(Silent)
        };
        let dispatcher = Dispatcher::new(SyncEngine::new(client), sound);
        let clock = Clock::spawn(Duration::from_millis(config.clock_interval_ms.max(100)));
        tracing::info!(sheet = %config.sheet_name, "context ready");

        Ok(Self {
            config,
            dispatcher,
            clock,
        })
    }

    /// The action that loads the first view.
    pub fn initial_action(&self) -> Action {
        let filter = if self.config.default_filter_today {
            today_string()
        } else {
            String::new()
        };
        Action::SetFilter(filter)
    }

    pub fn teardown(self) {
        self.clock.stop();
        tracing::info!("context torn down");
    }
}
