use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "MONITOR_MIGRATE_";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
}

impl LoggingConfig {
    const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    const DEFAULT_LEVEL: &str = "info";

    fn default() -> Self {
        LoggingConfig {
            level: Self::DEFAULT_LEVEL.to_string(),
        }
    }

    fn ensure_valid(&mut self) {
        let str_original = self.level.clone();
        self.level = self.level.trim().to_ascii_lowercase();
        if !Self::LOG_LEVELS.contains(&self.level.as_str()) {
            eprintln!(
                "Config error: log level of '{}' is invalid - using default of '{}'",
                str_original,
                Self::DEFAULT_LEVEL
            );
            self.level = Self::DEFAULT_LEVEL.to_owned();
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoresConfig {
    pub source: PathBuf,
    pub destination: PathBuf,
    busy_timeout_ms: u64,
}

impl StoresConfig {
    const SOURCE_PATH: &str = "bot-old.db";
    const DESTINATION_PATH: &str = "bot.db";
    const BUSY_TIMEOUT_MS: u64 = 5000;

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    fn default() -> Self {
        StoresConfig {
            source: PathBuf::from(Self::SOURCE_PATH),
            destination: PathBuf::from(Self::DESTINATION_PATH),
            busy_timeout_ms: Self::BUSY_TIMEOUT_MS,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub logging: LoggingConfig,
    pub stores: StoresConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            logging: LoggingConfig::default(),
            stores: StoresConfig::default(),
        }
    }
}

impl Config {
    /// Loads `config.toml` from the platform config directory. A missing
    /// directory or file just means defaults (plus environment overrides).
    pub fn load() -> Self {
        match ProjectDirs::from("", "", "monitor-migrate") {
            Some(project_dirs) => Self::load_from(&project_dirs.config_dir().join("config.toml")),
            None => Self::load_from(Path::new("config.toml")),
        }
    }

    /// Layers defaults, the TOML file at `config_path` (if it exists) and
    /// `MONITOR_MIGRATE_*` environment variables, e.g.
    /// `MONITOR_MIGRATE_STORES__SOURCE=/srv/bot-old.db`.
    pub fn load_from(config_path: &Path) -> Self {
        let default_config = Config::default();

        let figment = Figment::from(Serialized::defaults(default_config.clone()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        // Attempt to extract the configuration; on error, log a message and fall back to defaults.
        let mut config = figment.extract().unwrap_or_else(|err| {
            eprintln!(
                "Could not load config file {}: {}. Using default configuration.",
                config_path.display(),
                err
            );
            default_config
        });

        config.ensure_valid();

        config
    }

    fn ensure_valid(&mut self) {
        self.logging.ensure_valid();
    }
}
