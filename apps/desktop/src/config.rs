use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "iris.toml";
pub const DEFAULT_API_URL: &str = "https://postech-flask-ml-fase-1.vercel.app";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then the config file, then `IRIS_API_URL` / `APP__API_URL`, then
/// the `--api-url` flag.
pub fn load_settings(config_path: Option<&Path>, cli_api_url: Option<&str>) -> anyhow::Result<Settings> {
    let file = read_config_file(config_path)?;
    resolve_settings(file, |key| std::env::var(key).ok(), cli_api_url)
}

fn read_config_file(config_path: Option<&Path>) -> anyhow::Result<Option<FileSettings>> {
    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    if !required && !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    parse_config(&raw, &path).map(Some)
}

fn parse_config(raw: &str, origin: &Path) -> anyhow::Result<FileSettings> {
    toml::from_str(raw).with_context(|| format!("invalid config file '{}'", origin.display()))
}

fn resolve_settings(
    file: Option<FileSettings>,
    env: impl Fn(&str) -> Option<String>,
    cli_api_url: Option<&str>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(file) = file {
        if let Some(v) = file.api_url {
            settings.api_url = v;
        }
        if let Some(v) = file.request_timeout_secs {
            settings.request_timeout_secs = v;
        }
    }

    if let Some(v) = env("IRIS_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = cli_api_url {
        settings.api_url = v.to_string();
    }

    if settings.request_timeout_secs == 0 {
        bail!("request_timeout_secs must be at least 1");
    }
    settings.api_url = normalize_api_url(&settings.api_url)?;
    Ok(settings)
}

/// Validates an http(s) base URL and strips trailing slashes so endpoint
/// paths can be appended directly.
pub fn normalize_api_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim();
    let parsed =
        Url::parse(trimmed).with_context(|| format!("invalid API base URL '{trimmed}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!(
            "API base URL must use http or https, got '{}'",
            parsed.scheme()
        );
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        bail!("API base URL must not carry a query or fragment: '{trimmed}'");
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
