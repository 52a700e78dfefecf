use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use shared::protocol::{SortKey, DEFAULT_ORDER_BY, DEFAULT_PAGE_SIZE};

pub const DEFAULT_CONFIG_FILE: &str = "orders-console.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub storage_path: PathBuf,
    pub page_size: u32,
    pub order_by: SortKey,
    pub utc_offset_minutes: i32,
    pub color: bool,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".into(),
            storage_path: default_storage_path(),
            page_size: DEFAULT_PAGE_SIZE,
            order_by: DEFAULT_ORDER_BY.parse().unwrap_or_default(),
            utc_offset_minutes: -180,
            color: true,
            log_filter: "warn".into(),
        }
    }
}

impl Settings {
    /// Fixed offset used to display timestamps; out-of-range values fall back to UTC.
    pub fn display_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_base_url: Option<String>,
    storage_path: Option<PathBuf>,
    page_size: Option<u32>,
    order_by: Option<String>,
    utc_offset_minutes: Option<i32>,
    color: Option<bool>,
    log_filter: Option<String>,
}

pub fn default_storage_path() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("orders-console")
        .join("storage.json")
}

/// Defaults, then the TOML file, then `APP__*` environment variables.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_with(config_path, |key| std::env::var(key).ok())
}

pub fn load_settings_with(
    config_path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
            apply_file_settings(&mut settings, file_cfg)?;
        }
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__STORAGE_PATH") {
        settings.storage_path = PathBuf::from(v);
    }
    if let Some(v) = env("APP__PAGE_SIZE") {
        settings.page_size = v
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .with_context(|| format!("APP__PAGE_SIZE must be a positive integer, got '{v}'"))?;
    }
    if let Some(v) = env("APP__ORDER_BY") {
        settings.order_by = v
            .parse()
            .with_context(|| format!("APP__ORDER_BY is not a sort key: '{v}'"))?;
    }
    if let Some(v) = env("APP__UTC_OFFSET_MINUTES") {
        settings.utc_offset_minutes = v
            .parse()
            .with_context(|| format!("APP__UTC_OFFSET_MINUTES must be an integer, got '{v}'"))?;
    }
    if let Some(v) = env("APP__COLOR") {
        settings.color = parse_bool(&v)
            .with_context(|| format!("APP__COLOR must be true or false, got '{v}'"))?;
    }
    if env("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        settings.color = false;
    }
    if let Some(v) = env("RUST_LOG") {
        settings.log_filter = v;
    }

    Ok(settings)
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) -> anyhow::Result<()> {
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.storage_path {
        settings.storage_path = v;
    }
    if let Some(v) = file_cfg.page_size {
        anyhow::ensure!(v > 0, "page_size must be positive");
        settings.page_size = v;
    }
    if let Some(v) = file_cfg.order_by {
        settings.order_by = v
            .parse()
            .with_context(|| format!("order_by is not a sort key: '{v}'"))?;
    }
    if let Some(v) = file_cfg.utc_offset_minutes {
        settings.utc_offset_minutes = v;
    }
    if let Some(v) = file_cfg.color {
        settings.color = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    Ok(())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
