//! Settings loading
//!
//! Reads the JSON settings file, applies `.env`/environment overrides and
//! validates everything up front so a missing credential is reported here
//! rather than as an authentication failure from the service.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SETTINGS_FILE: &str = "appsettings.json";
pub const DEFAULT_THUMBNAIL_PATH: &str = "thumbnail.jpg";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Raw shape of the settings file before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawSettings {
    cognitive_service_endpoint: Option<String>,
    cognitive_service_key: Option<String>,
    thumbnail_path: Option<String>,
    request_timeout_seconds: Option<u64>,
    fetch_remote_images: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint: reqwest::Url,
    pub key: String,
    pub thumbnail_path: PathBuf,
    pub request_timeout: Duration,
    pub fetch_remote_images: bool,
}

impl Settings {
    /// Load settings from `path`, with environment variables taking precedence.
    pub fn load(path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();

        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!(
                "cannot read settings file {}: {}",
                path.display(),
                e
            ))
        })?;

        let settings =
            Self::from_json_with_overrides(&contents, |name| std::env::var(name).ok())?;
        tracing::info!(
            "Loaded settings from {} (endpoint: {})",
            path.display(),
            settings.endpoint
        );
        Ok(settings)
    }

    /// Parse settings JSON without consulting the environment.
    pub fn from_json(contents: &str) -> Result<Self> {
        Self::from_json_with_overrides(contents, |_| None)
    }

    pub fn from_json_with_overrides<F>(contents: &str, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut raw: RawSettings = serde_json::from_str(contents)
            .map_err(|e| Error::Configuration(format!("invalid settings JSON: {}", e)))?;

        if let Some(value) = env("COGNITIVE_SERVICE_ENDPOINT") {
            raw.cognitive_service_endpoint = Some(value);
        }
        if let Some(value) = env("COGNITIVE_SERVICE_KEY") {
            raw.cognitive_service_key = Some(value);
        }
        if let Some(value) = env("THUMBNAIL_PATH") {
            raw.thumbnail_path = Some(value);
        }
        if let Some(value) = env("REQUEST_TIMEOUT_SECONDS") {
            let secs = value.trim().parse().map_err(|_| {
                Error::Configuration(format!("REQUEST_TIMEOUT_SECONDS is not a number: {}", value))
            })?;
            raw.request_timeout_seconds = Some(secs);
        }
        if let Some(value) = env("FETCH_REMOTE_IMAGES") {
            let flag = parse_flag(&value).ok_or_else(|| {
                Error::Configuration(format!("FETCH_REMOTE_IMAGES is not a boolean: {}", value))
            })?;
            raw.fetch_remote_images = Some(flag);
        }

        Self::validate(raw)
    }

    fn validate(raw: RawSettings) -> Result<Self> {
        let endpoint = required(raw.cognitive_service_endpoint, "CognitiveServiceEndpoint")?;
        let key = required(raw.cognitive_service_key, "CognitiveServiceKey")?;

        let endpoint = reqwest::Url::parse(&endpoint).map_err(|e| {
            Error::Configuration(format!(
                "CognitiveServiceEndpoint is not a valid URL ({}): {}",
                endpoint, e
            ))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") || !endpoint.has_host() {
            return Err(Error::Configuration(format!(
                "CognitiveServiceEndpoint must be an absolute http(s) URL: {}",
                endpoint
            )));
        }

        let timeout_secs = raw.request_timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Configuration(
                "RequestTimeoutSeconds must be greater than zero".to_string(),
            ));
        }

        let thumbnail_path = raw
            .thumbnail_path
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_THUMBNAIL_PATH.to_string());

        Ok(Self {
            endpoint,
            key,
            thumbnail_path: resolve_path(PathBuf::from(thumbnail_path)),
            request_timeout: Duration::from_secs(timeout_secs),
            fetch_remote_images: raw.fetch_remote_images.unwrap_or(false),
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::Configuration(format!(
            "required setting {} is missing or empty",
            field
        ))),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

// Relative paths are anchored to the working directory at startup.
fn resolve_path(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(e) => {
            tracing::warn!("Cannot resolve working directory: {}", e);
            path
        }
    }
}
