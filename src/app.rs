use crate::error::{ChatError, Result};
use directories::BaseDirs;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "https://noisy-haze-453b.crinkle-crease-official.workers.dev";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the reply service; `/api/message` is appended.
    pub endpoint: String,
    /// SQLite file holding transcripts. Defaults to the platform data dir.
    pub database: Option<PathBuf>,
    pub simulate_latency: bool,
    /// User/assistant turns sent to the reply service as context, at most 8.
    pub history_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            database: None,
            simulate_latency: true,
            history_limit: 8,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("mona-chat.toml"))
    }

    /// Reads the config file. A missing file gives defaults; a malformed one is
    /// reported and also gives defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Self::default();
        };
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(_) => return Self::default(),
        };
        match toml::from_str::<AppConfig>(&text) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring malformed config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(Self::default_path)
            .ok_or_else(|| ChatError::Config("no config dir".into()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self).map_err(|e| ChatError::Config(e.to_string()))?;
        fs::write(&path, toml)?;
        Ok(path)
    }

    pub fn database_path(&self) -> Option<PathBuf> {
        self.database.clone().or_else(crate::storage::default_db_path)
    }
}
