use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub calendar: CalendarConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// IANA timezone identifier used for exception-date matching and
    /// local-weekday display.
    pub rendering_timezone: String,
    /// Upper bound on occurrences produced by a single expansion.
    pub max_instances: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default(
                "calendar.rendering_timezone",
                crate::constants::DEFAULT_RENDERING_TZ,
            )?
            .set_default(
                "calendar.max_instances",
                i64::try_from(crate::constants::DEFAULT_MAX_INSTANCES)?,
            )?
            .set_default("logging.level", "debug")?
            // Env file
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("_")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Checks that the loaded settings are usable.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` if the rendering timezone is empty or
    /// the instance cap is zero.
    pub fn validate(&self) -> CoreResult<()> {
        if self.calendar.rendering_timezone.is_empty() {
            return Err(CoreError::ConfigError(
                "calendar.rendering_timezone must not be empty".to_string(),
            ));
        }
        if self.calendar.max_instances == 0 {
            return Err(CoreError::ConfigError(
                "calendar.max_instances must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let settings = Settings {
            calendar: CalendarConfig {
                rendering_timezone: crate::constants::DEFAULT_RENDERING_TZ.to_string(),
                max_instances: crate::constants::DEFAULT_MAX_INSTANCES,
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
            },
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn zero_instance_cap_rejected() {
        let settings = Settings {
            calendar: CalendarConfig {
                rendering_timezone: "Europe/Berlin".to_string(),
                max_instances: 0,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        };
        assert!(settings.validate().is_err());
    }
}
