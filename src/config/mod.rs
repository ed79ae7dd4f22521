use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_timers_file")]
    pub timers_file: String,
    /// Recorded as the author of submitted time entries.
    #[serde(default)]
    pub user: Option<String>,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}

fn default_timers_file() -> String {
    Config::timers_file_default().to_string_lossy().to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            timers_file: default_timers_file(),
            user: None,
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("rworklog")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".rworklog")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rworklog.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rworklog.sqlite")
    }

    /// Return the default path of the timer registry
    pub fn timers_file_default() -> PathBuf {
        Self::config_dir().join("timers.json")
    }

    /// Load configuration from `path`; defaults when the file is missing.
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }

    /// Load configuration from the standard location.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    /// Timer registry path with `~` expanded.
    pub fn timers_path(&self) -> PathBuf {
        expand_tilde(&self.timers_file)
    }

    /// Database path with `~` expanded.
    pub fn database_path(&self) -> String {
        expand_tilde(&self.database).to_string_lossy().to_string()
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(yaml.as_bytes())?;
        Ok(())
    }

    /// Create the configuration directory and file (unless `is_test`) and
    /// return the configuration that was written.
    pub fn init_all(
        custom_db: Option<String>,
        custom_timers: Option<String>,
        user: Option<String>,
        is_test: bool,
    ) -> AppResult<Self> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let resolve = |name: String| {
            let p = expand_tilde(&name);
            if p.is_absolute() {
                p
            } else {
                dir.join(p)
            }
        };

        let mut config = Config::default();
        if let Some(db) = custom_db {
            config.database = resolve(db).to_string_lossy().to_string();
        }
        if let Some(timers) = custom_timers {
            config.timers_file = resolve(timers).to_string_lossy().to_string();
        }
        config.user = user;

        if !is_test {
            config.save_to(&Self::config_file())?;
        }
        Ok(config)
    }
}
