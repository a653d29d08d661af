// File: ./src/config.rs
use crate::client::DEFAULT_API_BASE;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const TOKEN_ENV: &str = "TASKFLOW_ACCESS_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    /// OAuth bearer token; obtaining it is left to the user.
    pub access_token: String,
    pub api_base: String,
    pub request_timeout_secs: u64,
    pub clock_interval_ms: u64,
    pub sound: bool,
    /// Start with the date filter set to today.
    pub default_filter_today: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheet_name: "Sheet1".to_string(),
            access_token: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: 15,
            clock_interval_ms: 1000,
            sound: true,
            default_filter_today: true,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "taskflow", "taskflow")
}

impl Config {
    pub fn path() -> Option<PathBuf> {
        project_dirs().map(|d| d.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        project_dirs().map(|d| d.data_dir().to_path_buf())
    }

    /// Reads the config file (defaults if it doesn't exist yet), then
    /// applies the token override from the environment.
    pub fn load() -> Result<Self> {
        let mut config = match Self::path() {
            Some(path) if path.exists() => {
                let raw = fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                Self::from_toml(&raw).with_context(|| format!("parsing {}", path.display()))?
            }
            _ => Self::default(),
        };
        if let Ok(token) = std::env::var(TOKEN_ENV)
            && !token.is_empty()
        {
            config.access_token = token;
        }
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::path().context("no home directory")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        !self.spreadsheet_id.is_empty() && !self.access_token.is_empty()
    }
}
