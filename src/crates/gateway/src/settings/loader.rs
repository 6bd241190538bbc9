//! Settings loader with layered files and environment expansion
//!
//! String values may reference the environment as `${VAR}` or
//! `${VAR:default}`.

use super::{GatewaySettings, SettingsFile};
use crate::error::{GatewayError, Result};
use regex::Regex;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::fs;
use tracing::{debug, info};

const FILE_NAME: &str = "gateway.toml";

/// Loads [`GatewaySettings`] from the user and project locations.
pub struct SettingsLoader {
    user_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsLoader {
    /// Loader for the standard locations.
    pub fn new() -> Self {
        Self {
            user_path: dirs::config_dir().map(|dir| dir.join("gateway").join(FILE_NAME)),
            project_path: Some(PathBuf::from(FILE_NAME)),
        }
    }

    /// Loader with explicit user and project locations.
    pub fn with_paths(user_path: Option<PathBuf>, project_path: Option<PathBuf>) -> Self {
        Self {
            user_path,
            project_path,
        }
    }

    pub fn user_path(&self) -> Option<&Path> {
        self.user_path.as_deref()
    }

    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    /// Load defaults, then user and project files if present, then `explicit`.
    ///
    /// Missing user/project files are skipped. A missing `explicit` file, or
    /// any file that fails to parse, is an error.
    pub async fn load(&self, explicit: Option<&Path>) -> Result<GatewaySettings> {
        let mut settings = GatewaySettings::default();

        for path in [self.user_path.as_deref(), self.project_path.as_deref()]
            .into_iter()
            .flatten()
        {
            if fs::try_exists(path).await.unwrap_or(false) {
                settings.apply(load_file(path).await?);
                debug!(path = %path.display(), "Loaded settings file");
            } else {
                debug!(path = %path.display(), "Settings file not found, skipping");
            }
        }

        if let Some(path) = explicit {
            settings.apply(load_file(path).await?);
            debug!(path = %path.display(), "Loaded explicit settings file");
        }

        info!(
            primary = %settings.primary.model_name,
            secondary = %settings.secondary.model_name,
            "Settings loaded"
        );
        Ok(settings)
    }
}

/// Read, expand and parse one settings file.
pub async fn load_file(path: &Path) -> Result<SettingsFile> {
    let content = fs::read_to_string(path).await.map_err(|e| {
        GatewayError::Configuration(format!("Failed to read {}: {}", path.display(), e))
    })?;
    parse_settings(&content).map_err(|e| match e {
        GatewayError::Configuration(msg) => {
            GatewayError::Configuration(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

/// Parse settings text, expanding environment references in string values.
pub fn parse_settings(content: &str) -> Result<SettingsFile> {
    let mut value: toml::Value = toml::from_str(content)?;
    expand_variables(&mut value);
    Ok(value.try_into::<SettingsFile>()?)
}

fn expand_variables(value: &mut toml::Value) {
    match value {
        toml::Value::String(s) => {
            if let Some(expanded) = expand_env_in_string(s) {
                *s = expanded;
            }
        }
        toml::Value::Table(table) => {
            for (_, v) in table.iter_mut() {
                expand_variables(v);
            }
        }
        toml::Value::Array(items) => {
            for item in items.iter_mut() {
                expand_variables(item);
            }
        }
        _ => {}
    }
}

fn env_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::([^}]*))?\}").ok())
        .as_ref()
}

/// Expand `${VAR}` / `${VAR:default}` references. Unset variables without
/// a default are left as written.
fn expand_env_in_string(s: &str) -> Option<String> {
    if !s.contains("${") {
        return None;
    }

    let expanded = env_pattern()?.replace_all(s, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        match (env::var(name), caps.get(2)) {
            (Ok(value), _) => value,
            (Err(_), Some(default)) => default.as_str().to_string(),
            (Err(_), None) => caps[0].to_string(),
        }
    });

    Some(expanded.into_owned())
}
