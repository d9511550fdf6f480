//! User settings: catalog URL, API key and import preferences
//!
//! Settings live in `<config dir>/shadercloud/settings.json`. Environment
//! variables override the file.

use crate::constants::{api, env};
use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Catalog base URL, always ending with `/`
    pub api_url: String,
    pub api_key: String,
    /// Lay out imported node trees automatically
    pub use_arranger: bool,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: api::DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            use_arranger: true,
            timeout_secs: api::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Default location of the settings file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("shadercloud").join("settings.json"))
    }

    /// Loads settings from the default location, then applies the environment
    pub fn load() -> Result<Self> {
        let mut settings = match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok());
        settings.normalize();
        settings.validate()?;
        Ok(settings)
    }

    /// Reads a settings file; missing fields keep their defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading settings from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let mut settings: Settings = serde_json::from_str(&content)?;
        settings.normalize();
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Applies overrides from a variable lookup (the process environment in `load`)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(env::API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        if let Some(key) = lookup(env::API_KEY) {
            self.api_key = key.trim().to_string();
        }
    }

    /// Ensures the base URL ends with a slash
    pub fn normalize(&mut self) {
        if !self.api_url.ends_with('/') {
            self.api_url.push('/');
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "api_url must start with http:// or https://, got: {}",
                self.api_url
            )));
        }
        if !self.api_url.ends_with('/') {
            return Err(Error::Config("api_url must end with '/'".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.api_url, "https://shader.cloud/");
        assert!(settings.use_arranger);
        settings.validate().unwrap();
    }

    #[test]
    fn test_overrides_and_normalization() {
        let mut settings = Settings::default();
        settings.apply_overrides(|key| match key {
            "SHADERCLOUD_API_URL" => Some("http://localhost:8000".to_string()),
            "SHADERCLOUD_API_KEY" => Some(" secret ".to_string()),
            _ => None,
        });
        settings.normalize();
        assert_eq!(settings.api_url, "http://localhost:8000/");
        assert_eq!(settings.api_key, "secret");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"api_key": "abc", "use_arranger": false}"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.api_key, "abc");
        assert!(!settings.use_arranger);
        assert_eq!(settings.api_url, "https://shader.cloud/");
        assert_eq!(settings.timeout_secs, 30);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            api_key: "key".to_string(),
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_rejects_bad_url_and_timeout() {
        let bad_url = Settings {
            api_url: "shader.cloud/".to_string(),
            ..Settings::default()
        };
        assert!(matches!(bad_url.validate(), Err(Error::Config(_))));

        let no_timeout = Settings {
            timeout_secs: 0,
            ..Settings::default()
        };
        assert!(no_timeout.validate().is_err());
    }
}
