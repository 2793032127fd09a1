// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub const APP_NAME: &str = "coatsel";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub catalog: CatalogSection,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            catalog: CatalogSection::default(),
            logging: Logging::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSection {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logging {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("COATSEL_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set COATSEL_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [catalog] and [logging]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let mut config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        config.anchor_catalog_path(path);
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.version != CONFIG_VERSION {
            bail!(
                "config {} has version {}; expected {CONFIG_VERSION}",
                path.display(),
                self.version
            );
        }

        if let Some(catalog) = &self.catalog.path
            && catalog.trim().is_empty()
        {
            bail!(
                "catalog.path in {} is empty -- remove it to use the built-in catalog",
                path.display()
            );
        }

        let level = self.log_level();
        if level != "off" {
            EnvFilter::try_new(level).map_err(|error| {
                anyhow!(
                    "logging.level {level:?} in {} is not a valid filter: {error}",
                    path.display()
                )
            })?;
        }
        Ok(())
    }

    // Relative catalog paths are relative to the config file, not the cwd.
    fn anchor_catalog_path(&mut self, config_path: &Path) {
        let Some(raw) = &self.catalog.path else {
            return;
        };
        let candidate = PathBuf::from(raw);
        if candidate.is_absolute() {
            return;
        }
        if let Some(dir) = config_path.parent() {
            self.catalog.path = Some(dir.join(candidate).to_string_lossy().into_owned());
        }
    }

    /// Catalog file to load; the `--catalog` flag wins over the config.
    pub fn catalog_path(&self, flag: Option<&Path>) -> Option<PathBuf> {
        flag.map(Path::to_path_buf)
            .or_else(|| self.catalog.path.as_ref().map(PathBuf::from))
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .level
            .as_deref()
            .map(str::trim)
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        match &self.logging.file {
            Some(path) => Ok(PathBuf::from(path)),
            None => default_log_path(),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# coatsel config\n# Place this file at: {}\n\nversion = 1\n\n[catalog]\n# Optional. Without it the built-in catalog is used.\n# Relative paths resolve against this file's directory.\n# path = \"catalog.toml\"\n\n[logging]\n# Any tracing filter directive, or \"off\". COATSEL_LOG overrides it.\nlevel = \"{}\"\n# Optional. Default is the platform data dir (for example ~/.local/share/coatsel/coatsel.log)\n# file = \"/absolute/path/to/coatsel.log\"\n",
            path.display(),
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn default_log_path() -> Result<PathBuf> {
    let data_root = dirs::data_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set [logging].file to an explicit path")
    })?;
    Ok(data_root.join(APP_NAME).join("coatsel.log"))
}
