use crate::app_dirs::AppDirs;
use crate::controller::SessionConfig;
use crate::error::Result;
use crate::word_bank::WordBank;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub duration_secs: u64,
    pub word_bank: String,
    /// Optional JSON word bank file; takes precedence over `word_bank`.
    pub words_file: Option<PathBuf>,
    pub tick_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration_secs: 30,
            word_bank: "common".to_string(),
            words_file: None,
            tick_ms: 100,
        }
    }
}

impl Config {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// Resolve the bank and duration into a validated session configuration.
    pub fn session_config(&self) -> Result<SessionConfig> {
        let bank = match &self.words_file {
            Some(path) => WordBank::from_json_file(path)?,
            None => WordBank::by_name(&self.word_bank)?,
        };
        let config = SessionConfig::new(Duration::from_secs(self.duration_secs), bank);
        config.validate()?;
        Ok(config)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("keysprint_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        fs::read(&self.path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<Config>(&bytes).ok())
            .unwrap_or_default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
