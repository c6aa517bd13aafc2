use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::DEFAULT_API_BASE_URL;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "browser.toml";

/// Environment overrides, applied in order so later entries win.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("RICKMORTY_API_URL", "api_base_url"),
    ("APP__API_BASE_URL", "api_base_url"),
    ("APP__REQUEST_TIMEOUT_SECONDS", "request_timeout_seconds"),
    ("APP__LIST_PAGE", "list_page"),
    ("APP__GRID_COLUMNS", "grid_columns"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_seconds: Option<u64>,
    pub list_page: u32,
    pub grid_columns: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_seconds: None,
            list_page: 1,
            grid_columns: 2,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }

    /// Applies one named setting. Unknown keys and unparsable values are
    /// logged and skipped.
    fn set(&mut self, key: &str, value: &str) {
        let value = value.trim();
        match key {
            "api_base_url" => self.api_base_url = value.to_string(),
            "request_timeout_seconds" => match value.parse::<u64>() {
                Ok(0) => self.request_timeout_seconds = None,
                Ok(seconds) => self.request_timeout_seconds = Some(seconds),
                Err(_) => warn!(key, value, "ignoring invalid timeout"),
            },
            "list_page" => match value.parse::<u32>() {
                Ok(page) if page >= 1 => self.list_page = page,
                _ => warn!(key, value, "ignoring invalid page number"),
            },
            "grid_columns" => match value.parse::<usize>() {
                Ok(columns) if columns >= 1 => self.grid_columns = columns,
                _ => warn!(key, value, "ignoring invalid column count"),
            },
            other => warn!(key = other, "ignoring unknown setting"),
        }
    }
}

/// Layers defaults, the TOML file, then environment variables.
///
/// An explicitly requested config file must be readable; the default
/// `browser.toml` is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?,
        Err(err) if config_path.is_some() => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let table: toml::Table = raw.parse()?;
    for (key, value) in &table {
        let value = match value {
            toml::Value::String(text) => text.clone(),
            toml::Value::Integer(number) => number.to_string(),
            other => {
                warn!(key = key.as_str(), value = %other, "ignoring non-scalar setting");
                continue;
            }
        };
        settings.set(key, &value);
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    for (name, key) in ENV_OVERRIDES {
        if let Some(value) = lookup(name) {
            settings.set(key, &value);
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
