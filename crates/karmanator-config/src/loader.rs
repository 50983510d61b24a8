use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::schema::{KarmaConfig, WarningSeverity};

/// Loads the Karmanator configuration.
pub struct ConfigLoader {
    config: KarmaConfig,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > KARMANATOR_CONFIG env > ~/.karmanator/karmanator.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("KARMANATOR_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".karmanator")
            .join("karmanator.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> karmanator_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            let raw = std::fs::read_to_string(&config_path)?;
            Self::parse(&raw, &config_path)?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            KarmaConfig::default()
        };

        let config = Self::apply_env_overrides(config);

        for w in config.validate()? {
            match w.severity {
                WarningSeverity::Info => info!("{}", w),
                _ => warn!("{}", w),
            }
        }

        Ok(Self {
            config,
            config_path,
        })
    }

    fn parse(raw: &str, config_path: &Path) -> karmanator_core::Result<KarmaConfig> {
        toml::from_str::<KarmaConfig>(raw).map_err(|e| {
            karmanator_core::KarmaError::Config(format!(
                "failed to parse {}: {}",
                config_path.display(),
                e
            ))
        })
    }

    /// Get a copy of the loaded config.
    pub fn get(&self) -> KarmaConfig {
        self.config.clone()
    }

    /// Path the config was resolved from (whether or not it exists).
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Apply env var overrides (KARMANATOR_NICK, KARMANATOR_SERVER, etc.)
    fn apply_env_overrides(mut config: KarmaConfig) -> KarmaConfig {
        if let Ok(v) = std::env::var("KARMANATOR_NICK") {
            config.irc.nick = v;
        }
        if let Ok(v) = std::env::var("KARMANATOR_SERVER") {
            config.irc.server = v;
        }
        if let Ok(v) = std::env::var("KARMANATOR_PORT") {
            match v.parse::<u16>() {
                Ok(port) => config.irc.port = port,
                Err(_) => warn!(value = %v, "ignoring invalid KARMANATOR_PORT"),
            }
        }
        if let Ok(v) = std::env::var("KARMANATOR_STORE") {
            config.store.path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("KARMANATOR_LOG_LEVEL") {
            config.logging.level = v;
        }
        // Config file takes priority for the password, env is the fallback.
        if config.irc.password.is_none() {
            if let Ok(v) = std::env::var("KARMANATOR_PASSWORD") {
                config.irc.password = Some(v);
            }
        }
        config
    }
}
