//! Configuration management for smblinks
//!
//! Handles loading and saving configuration from ~/.config/smblinks/config.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::endpoint::EndpointResolver;

/// Configuration file name
const CONFIG_FILE: &str = "config.toml";

/// Application name for config directory
const APP_NAME: &str = "smblinks";

/// Server used when neither the CLI nor the config names one
pub const DEFAULT_SERVER: &str = "lagrange";

/// Links directory name under the home directory
const DEFAULT_LINKS_DIR: &str = "SMBLinks";

/// Credentials directory name under the home directory
const DEFAULT_CREDENTIALS_DIR: &str = ".credentials";

/// Shares assumed when discovery yields nothing usable
pub const DEFAULT_FALLBACK_SHARES: [&str; 4] = ["photo", "music", "video", "commun"];

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Server to connect to when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_server: Option<String>,

    /// Directory holding one symlink per mounted share (default: ~/SMBLinks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links_dir: Option<PathBuf>,

    /// Directory created with owner-only permissions (default: ~/.credentials)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_dir: Option<PathBuf>,

    /// Shares to offer when discovery fails or finds nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_shares: Option<Vec<String>>,

    /// Override for the runtime directory GVfs mounts under
    /// (default: $XDG_RUNTIME_DIR, else /run/user/<uid>)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_dir: Option<PathBuf>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the config file path
    ///
    /// Returns ~/.config/smblinks/config.toml on Linux
    pub fn config_path() -> ConfigResult<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Get the config directory path
    pub fn config_dir() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(APP_NAME))
    }

    /// Load configuration from the default location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, defaulting when it doesn't exist
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check if any configuration is set
    pub fn is_empty(&self) -> bool {
        self.default_server.is_none()
            && self.links_dir.is_none()
            && self.credentials_dir.is_none()
            && self.fallback_shares.is_none()
            && self.runtime_dir.is_none()
    }

    pub fn set_default_server(&mut self, server: Option<String>) {
        self.default_server = server;
    }

    pub fn set_links_dir(&mut self, dir: Option<PathBuf>) {
        self.links_dir = dir;
    }

    pub fn set_credentials_dir(&mut self, dir: Option<PathBuf>) {
        self.credentials_dir = dir;
    }

    pub fn set_fallback_shares(&mut self, shares: Option<Vec<String>>) {
        self.fallback_shares = shares;
    }

    pub fn set_runtime_dir(&mut self, dir: Option<PathBuf>) {
        self.runtime_dir = dir;
    }

    /// Get effective server: CLI argument, then config, then the built-in default
    pub fn effective_server(&self, cli_server: Option<&str>) -> String {
        cli_server
            .or(self.default_server.as_deref())
            .unwrap_or(DEFAULT_SERVER)
            .to_string()
    }

    /// Get effective links directory
    pub fn effective_links_dir(&self) -> PathBuf {
        self.links_dir
            .clone()
            .unwrap_or_else(|| home_dir().join(DEFAULT_LINKS_DIR))
    }

    /// Get effective credentials directory
    pub fn effective_credentials_dir(&self) -> PathBuf {
        self.credentials_dir
            .clone()
            .unwrap_or_else(|| home_dir().join(DEFAULT_CREDENTIALS_DIR))
    }

    /// Get effective fallback share list
    pub fn effective_fallback_shares(&self) -> Vec<String> {
        self.fallback_shares.clone().unwrap_or_else(|| {
            DEFAULT_FALLBACK_SHARES
                .iter()
                .map(|s| s.to_string())
                .collect()
        })
    }

    /// Build the endpoint resolver for this configuration
    pub fn endpoint_resolver(&self) -> EndpointResolver {
        match self.runtime_dir {
            Some(ref dir) => EndpointResolver::new(dir),
            None => EndpointResolver::for_current_user(),
        }
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Format the configuration for display
pub fn format_config(config: &Config) -> String {
    let mut lines = Vec::new();

    lines.push("Current configuration:".to_string());
    lines.push(String::new());

    match config.default_server {
        Some(ref server) => lines.push(format!("  default_server = \"{}\"", server)),
        None => lines.push(format!(
            "  default_server = (not set, using \"{}\")",
            DEFAULT_SERVER
        )),
    }

    match config.links_dir {
        Some(ref dir) => lines.push(format!("  links_dir = \"{}\"", dir.display())),
        None => lines.push(format!(
            "  links_dir = (not set, using {})",
            config.effective_links_dir().display()
        )),
    }

    match config.credentials_dir {
        Some(ref dir) => lines.push(format!("  credentials_dir = \"{}\"", dir.display())),
        None => lines.push(format!(
            "  credentials_dir = (not set, using {})",
            config.effective_credentials_dir().display()
        )),
    }

    match config.fallback_shares {
        Some(ref shares) => lines.push(format!("  fallback_shares = {:?}", shares)),
        None => lines.push(format!(
            "  fallback_shares = (not set, using {:?})",
            DEFAULT_FALLBACK_SHARES
        )),
    }

    match config.runtime_dir {
        Some(ref dir) => lines.push(format!("  runtime_dir = \"{}\"", dir.display())),
        None => lines.push("  runtime_dir = (not set, using $XDG_RUNTIME_DIR)".to_string()),
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.default_server.is_none());
        assert!(config.links_dir.is_none());
        assert!(config.fallback_shares.is_none());
        assert!(config.is_empty());
    }

    #[test]
    fn test_config_setters() {
        let mut config = Config::new();

        config.set_default_server(Some("nas".to_string()));
        assert_eq!(config.default_server, Some("nas".to_string()));

        config.set_links_dir(Some(PathBuf::from("/tmp/links")));
        assert_eq!(config.links_dir, Some(PathBuf::from("/tmp/links")));

        config.set_fallback_shares(Some(vec!["docs".to_string()]));
        assert_eq!(config.fallback_shares, Some(vec!["docs".to_string()]));

        assert!(!config.is_empty());
    }

    #[test]
    fn test_effective_server_precedence() {
        let mut config = Config::new();
        assert_eq!(config.effective_server(None), "lagrange");

        config.set_default_server(Some("nas".to_string()));
        assert_eq!(config.effective_server(None), "nas");
        assert_eq!(config.effective_server(Some("other")), "other");
    }

    #[test]
    fn test_effective_fallback_shares_default() {
        let config = Config::new();
        assert_eq!(
            config.effective_fallback_shares(),
            vec!["photo", "music", "video", "commun"]
        );
    }

    #[test]
    fn test_effective_dirs() {
        let mut config = Config::new();
        assert!(config.effective_links_dir().ends_with("SMBLinks"));
        assert!(config.effective_credentials_dir().ends_with(".credentials"));

        config.set_links_dir(Some(PathBuf::from("/srv/links")));
        config.set_credentials_dir(Some(PathBuf::from("/srv/creds")));
        assert_eq!(config.effective_links_dir(), PathBuf::from("/srv/links"));
        assert_eq!(
            config.effective_credentials_dir(),
            PathBuf::from("/srv/creds")
        );
    }

    #[test]
    fn test_endpoint_resolver_override() {
        let mut config = Config::new();
        config.set_runtime_dir(Some(PathBuf::from("/tmp/rt")));
        assert_eq!(
            config.endpoint_resolver().runtime_dir(),
            Path::new("/tmp/rt")
        );
    }

    #[test]
    fn test_config_serialize_empty() {
        let config = Config::new();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(!toml_str.contains("default_server"));
        assert!(!toml_str.contains("links_dir"));
    }

    #[test]
    fn test_config_deserialize_partial() {
        let toml_str = r#"
            default_server = "nas"
            fallback_shares = ["docs", "media"]
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_server, Some("nas".to_string()));
        assert_eq!(
            config.effective_fallback_shares(),
            vec!["docs".to_string(), "media".to_string()]
        );
        assert!(config.links_dir.is_none());
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("config.toml")).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_load_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "default_server = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::new();
        config.set_default_server(Some("nas".to_string()));
        config.set_links_dir(Some(PathBuf::from("/tmp/links")));
        config.set_runtime_dir(Some(PathBuf::from("/tmp/rt")));

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_format_config_empty() {
        let output = format_config(&Config::new());
        assert!(output.contains("default_server = (not set, using \"lagrange\")"));
        assert!(output.contains("links_dir = (not set, using"));
        assert!(output.contains("runtime_dir = (not set"));
    }

    #[test]
    fn test_format_config_with_values() {
        let mut config = Config::new();
        config.set_default_server(Some("nas".to_string()));
        config.set_fallback_shares(Some(vec!["docs".to_string()]));

        let output = format_config(&config);
        assert!(output.contains("default_server = \"nas\""));
        assert!(output.contains("fallback_shares = [\"docs\"]"));
    }

    #[test]
    fn test_config_path() {
        if let Ok(path) = Config::config_path() {
            assert!(path.to_string_lossy().contains("smblinks"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
