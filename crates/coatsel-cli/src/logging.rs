// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::Config;
use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV: &str = "COATSEL_LOG";

/// Where log records go and which ones are kept. The terminal belongs to the
/// form, so records always go to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub filter: String,
    pub file: PathBuf,
}

impl LogSettings {
    /// `None` when logging is switched off.
    pub fn resolve(config: &Config) -> Result<Option<Self>> {
        let Some(filter) = filter_directive(config, env::var(LOG_ENV).ok()) else {
            return Ok(None);
        };
        Ok(Some(Self {
            filter,
            file: config.log_file()?,
        }))
    }
}

fn filter_directive(config: &Config, env_value: Option<String>) -> Option<String> {
    let directive = env_value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| config.log_level().to_owned());
    if directive.eq_ignore_ascii_case("off") {
        return None;
    }
    Some(directive)
}

/// Installs file logging unless it is switched off. Callers treat an error
/// as "run without logs".
pub fn start(config: &Config) -> Result<()> {
    match LogSettings::resolve(config)? {
        Some(settings) => init_logging(&settings),
        None => Ok(()),
    }
}

pub fn init_logging(settings: &LogSettings) -> Result<()> {
    let filter = EnvFilter::try_new(&settings.filter)
        .map_err(|error| anyhow!("invalid log filter {:?}: {error}", settings.filter))?;

    if let Some(dir) = settings.file.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("create log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.file)
        .with_context(|| {
            format!(
                "open log file {} -- set [logging].file or COATSEL_LOG=off",
                settings.file.display()
            )
        })?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

#[cfg(test)]
mod tests {
    use super::{LogSettings, filter_directive, init_logging};
    use crate::config::{Config, Logging};
    use anyhow::Result;

    fn config_with_level(level: &str) -> Config {
        Config {
            logging: Logging {
                level: Some(level.to_owned()),
                file: None,
            },
            ..Config::default()
        }
    }

    #[test]
    fn config_level_is_used_without_env() {
        assert_eq!(
            filter_directive(&config_with_level("debug"), None),
            Some("debug".to_owned())
        );
    }

    #[test]
    fn env_value_overrides_config_level() {
        assert_eq!(
            filter_directive(
                &config_with_level("warn"),
                Some("coatsel_tui=trace".to_owned())
            ),
            Some("coatsel_tui=trace".to_owned())
        );
    }

    #[test]
    fn blank_env_value_falls_back_to_config() {
        assert_eq!(
            filter_directive(&config_with_level("warn"), Some("  ".to_owned())),
            Some("warn".to_owned())
        );
    }

    #[test]
    fn off_disables_logging_from_either_source() {
        assert_eq!(filter_directive(&config_with_level("off"), None), None);
        assert_eq!(
            filter_directive(&config_with_level("info"), Some("OFF".to_owned())),
            None
        );
    }

    #[test]
    fn unopenable_log_file_is_an_error_not_a_panic() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "")?;
        let settings = LogSettings {
            filter: "debug".to_owned(),
            file: blocker.join("coatsel.log"),
        };
        let error = init_logging(&settings).expect_err("file parent is not a directory");
        assert!(error.to_string().contains("create log directory"), "{error}");
        Ok(())
    }
}
