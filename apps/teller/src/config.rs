use std::{
    collections::HashMap,
    fs,
    path::Path,
};

use anyhow::{anyhow, bail, Context, Result};

pub const DEFAULT_CONFIG_FILE: &str = "teller.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend_host: String,
    pub page_size: u32,
    pub request_timeout_secs: u64,
    pub confirm_mutations: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_host: "http://localhost:8085".into(),
            page_size: 5,
            request_timeout_secs: 10,
            confirm_mutations: false,
        }
    }
}

/// Defaults, then `teller.toml` (or `explicit_path`), then environment.
pub fn load_settings(explicit_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();

    match explicit_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            apply_file(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
                apply_file(&mut settings, &raw)
                    .with_context(|| format!("invalid config file '{DEFAULT_CONFIG_FILE}'"))?;
            }
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(raw)?;
    for (key, value) in &file_cfg {
        let value = match value {
            toml::Value::String(v) => v.clone(),
            toml::Value::Integer(v) => v.to_string(),
            toml::Value::Boolean(v) => v.to_string(),
            other => bail!("unsupported value for '{key}': {other}"),
        };
        match key.as_str() {
            "backend_host" => settings.backend_host = value,
            "page_size" => settings.page_size = parse_value(key, &value)?,
            "request_timeout_secs" => settings.request_timeout_secs = parse_value(key, &value)?,
            "confirm_mutations" => settings.confirm_mutations = parse_value(key, &value)?,
            _ => tracing::warn!(key = key.as_str(), "ignoring unknown config key"),
        }
    }
    Ok(())
}

pub(crate) fn apply_env(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(v) = lookup("LEDGER_BACKEND_HOST") {
        settings.backend_host = v;
    }
    if let Some(v) = lookup("APP__BACKEND_HOST") {
        settings.backend_host = v;
    }
    if let Some(v) = lookup("APP__PAGE_SIZE") {
        settings.page_size = parse_value("APP__PAGE_SIZE", &v)?;
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = parse_value("APP__REQUEST_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = lookup("APP__CONFIRM_MUTATIONS") {
        settings.confirm_mutations = parse_value("APP__CONFIRM_MUTATIONS", &v)?;
    }
    Ok(())
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow!("invalid value '{raw}' for {key}: {e}"))
}

impl Settings {
    /// Normalizes the host and clamps numeric settings into usable ranges.
    pub fn normalized(mut self) -> Self {
        self.backend_host = normalize_backend_host(&self.backend_host);
        self.page_size = self.page_size.max(1);
        self.request_timeout_secs = self.request_timeout_secs.max(1);
        self
    }
}

pub(crate) fn normalize_backend_host(raw_host: &str) -> String {
    let raw_host = raw_host.trim().trim_end_matches('/');

    if raw_host.is_empty() {
        return Settings::default().backend_host;
    }

    if raw_host.contains("://") {
        return raw_host.to_string();
    }

    format!("http://{raw_host}")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
