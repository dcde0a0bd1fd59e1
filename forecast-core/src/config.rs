use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "DARKSKY_API_KEY";

pub const DEFAULT_API_HOST: &str = "api.darksky.net";

/// Options handed to the HTTP client untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct HttpOptions {
    /// Proxy URL for all requests, e.g. `http://proxy.local:3128`.
    pub proxy: Option<String>,
    pub accept_invalid_certs: bool,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
///
/// [http]
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    /// Overrides [`DEFAULT_API_HOST`].
    pub api_host: Option<String>,
    pub http: HttpOptions,
}

impl Config {
    /// API key from the environment, falling back to the config file.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::api_key`] with a custom environment lookup.
    pub fn api_key_with<F>(&self, env: F) -> Option<String>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        env(API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|key| !key.trim().is_empty()))
    }

    pub fn api_host(&self) -> &str {
        self.api_host.as_deref().filter(|h| !h.is_empty()).unwrap_or(DEFAULT_API_HOST)
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_has_no_key_and_default_host() {
        let cfg = Config::default();
        assert_eq!(cfg.api_key_with(|_| None), None);
        assert_eq!(cfg.api_host(), DEFAULT_API_HOST);
    }

    #[test]
    fn environment_wins_over_file() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        let key = cfg.api_key_with(|name| {
            assert_eq!(name, API_KEY_ENV);
            Some("ENV_KEY".into())
        });
        assert_eq!(key.as_deref(), Some("ENV_KEY"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut cfg = Config::default();
        cfg.set_api_key("   ".into());
        assert_eq!(cfg.api_key_with(|_| Some(String::new())), None);

        cfg.set_api_key("FILE_KEY".into());
        assert_eq!(cfg.api_key_with(|_| Some(String::new())).as_deref(), Some("FILE_KEY"));
    }

    #[test]
    fn parses_toml_with_http_section() {
        let cfg = Config::from_toml(
            r#"
            api_key = "abc"
            api_host = "forecast.example.net"

            [http]
            proxy = "http://proxy.local:3128"
            accept_invalid_certs = true
            timeout_secs = 15
            "#,
        )
        .unwrap();

        assert_eq!(cfg.api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.api_host(), "forecast.example.net");
        assert_eq!(cfg.http.proxy.as_deref(), Some("http://proxy.local:3128"));
        assert!(cfg.http.accept_invalid_certs);
        assert_eq!(cfg.http.timeout_secs, Some(15));
        assert_eq!(cfg.http.user_agent, None);
    }

    #[test]
    fn toml_roundtrip() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.http.timeout_secs = Some(5);

        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), cfg);
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }
}
