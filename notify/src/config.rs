// Configuration management with layered configuration (file, env)

use crate::models::ChannelSettings;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub notification: NotificationConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Channel id registered with the host at startup
    pub channel_id: String,
    #[serde(default)]
    pub channel: ChannelSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment-specific configuration
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.notification.channel_id.is_empty() {
            return Err("Notification channel_id cannot be empty".to_string());
        }

        let color = &self.notification.channel.light_color;
        if !color.starts_with('#') || !(color.len() == 7 || color.len() == 9) {
            return Err("Channel light_color must be #RRGGBB or #AARRGGBB".to_string());
        }

        if self.observability.log_level.is_empty() {
            return Err("Observability log_level cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notification: NotificationConfig {
                channel_id: "default".to_string(),
                channel: ChannelSettings::default(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
            },
        }
    }
}
