//! # Settings Loader
//!
//! Centralized loading of the application settings file: the CRUD backend
//! and forecasting service base URLs, the base currency, and the currency
//! options offered by the conversion and bookkeeping forms.
//!
//! Every field has a default matching the known service deployment, so a
//! partial `settings.json` (or none at all, via [`load_or_default`]) still
//! yields a usable configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use models::Settings;

/// Loads settings from a JSON file.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading settings file: {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing settings JSON in {}", path.display()))?;
    Ok(settings)
}

/// Loads settings from the default location (settings.json in the current directory).
pub fn load_default_settings() -> Result<Settings> {
    load_settings("settings.json")
}

/// Loads settings from an optional path, returning None if no path is provided.
pub fn load_optional_settings(path: Option<&PathBuf>) -> Result<Option<Settings>> {
    match path {
        Some(settings_path) => Ok(Some(load_settings(settings_path)?)),
        None => Ok(None),
    }
}

/// Tries the provided path first, then the default location, and finally
/// falls back to built-in defaults. Never fails: a missing or malformed
/// settings file just means the stock service URLs are used.
pub fn load_or_default(path: Option<&PathBuf>) -> Settings {
    if let Some(settings_path) = path {
        if let Ok(settings) = load_settings(settings_path) {
            return settings;
        }
    }
    load_default_settings().unwrap_or_default()
}
