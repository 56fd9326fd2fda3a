use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::{BATCH_SIZE, BatchPolicy};
use crate::pool::Category;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub default_category: Category,
    #[serde(default = "default_pool_dir")]
    pub pool_dir: String,
    #[serde(default = "default_min_answers_before_advance")]
    pub min_answers_before_advance: usize,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_pool_dir() -> String {
    default_data_dir()
        .join("pools")
        .to_string_lossy()
        .to_string()
}
fn default_min_answers_before_advance() -> usize {
    1
}
fn default_log_filter() -> String {
    "info".to_string()
}

/// Directory holding progress, logs and pool overrides.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hamprep")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            default_category: Category::default(),
            pool_dir: default_pool_dir(),
            min_answers_before_advance: default_min_answers_before_advance(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hamprep")
            .join("config.toml")
    }

    pub fn pool_dir(&self) -> PathBuf {
        PathBuf::from(&self.pool_dir)
    }

    pub fn batch_policy(&self) -> BatchPolicy {
        BatchPolicy::new(self.min_answers_before_advance)
    }

    /// Clamp out-of-range values and fall back to defaults for unknown
    /// themes or blank strings. Call after loading a hand-edited file.
    pub fn validate(&mut self, available_themes: &[String]) {
        self.min_answers_before_advance = self.min_answers_before_advance.clamp(1, BATCH_SIZE);
        if !available_themes.iter().any(|t| t == &self.theme) {
            self.theme = default_theme();
        }
        if self.pool_dir.trim().is_empty() {
            self.pool_dir = default_pool_dir();
        }
        if self.log_filter.trim().is_empty() {
            self.log_filter = default_log_filter();
        }
    }
}
