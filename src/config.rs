use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::auth::Token;
use crate::context::Repository;
use crate::error::WaitError;
use crate::wait::WaitOptions;

/// Configuration file structure for deploywait.
///
/// Every value can also be given on the command line or through the environment,
/// which take precedence over the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// GitHub connection settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// What to wait for and for how long
    #[serde(default)]
    pub wait: WaitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// GitHub token
    pub token: Option<String>,

    /// GitHub API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Repository in 'owner/repo' form
    pub repository: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WaitConfig {
    /// Only consider deployments to this environment
    pub environment: Option<String>,

    /// Login of the account expected to create the deployment
    pub actor_name: Option<String>,

    /// Seconds each stage may poll for
    #[serde(default = "default_max_timeout")]
    pub max_timeout: u64,

    /// Accept a deployment whose latest status is `inactive`
    #[serde(default)]
    pub allow_inactive: bool,

    /// Path requested on the deployed URL
    #[serde(default = "default_path")]
    pub path: String,

    /// Seconds between attempts; fractions allowed
    #[serde(default = "default_check_interval")]
    pub check_interval: f64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_api_url(),
            repository: None,
        }
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            environment: None,
            actor_name: None,
            max_timeout: default_max_timeout(),
            allow_inactive: false,
            path: default_path(),
            check_interval: default_check_interval(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_max_timeout() -> u64 {
    60
}

fn default_path() -> String {
    "/".to_string()
}

fn default_check_interval() -> f64 {
    2.0
}

/// Validated settings the wait run is built from.
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: Token,
    pub api_url: String,
    pub repository: Repository,
    pub wait: WaitOptions,
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./deploywait.toml
    /// 3. ./deploywait.json
    /// 4. ./deploywait.yaml
    /// 5. ./deploywait.yml
    /// 6. `<user config dir>/deploywait/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "deploywait.toml",
            "deploywait.json",
            "deploywait.yaml",
            "deploywait.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        if let Some(path) = user_config_path().filter(|p| p.exists()) {
            return Self::load_from_path(&path);
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading config from: {}", path.display());

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    /// Checks the merged configuration and turns it into [`Settings`].
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::Config`] when a required value is missing or a value is out of range.
    pub fn into_settings(self) -> crate::error::Result<Settings> {
        let token = self
            .github
            .token
            .map(Token::from)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| WaitError::Config("a GitHub token is required".to_string()))?;

        let repository = self
            .github
            .repository
            .ok_or_else(|| WaitError::Config("a repository ('owner/repo') is required".to_string()))?
            .parse::<Repository>()?;

        let actor = self
            .wait
            .actor_name
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| WaitError::Config("an actor name is required".to_string()))?;

        if self.wait.max_timeout == 0 {
            return Err(WaitError::Config(
                "max timeout must be at least one second".to_string(),
            ));
        }

        Ok(Settings {
            token,
            api_url: self.github.api_url,
            repository,
            wait: WaitOptions {
                environment: self.wait.environment.filter(|e| !e.trim().is_empty()),
                actor,
                allow_inactive: self.wait.allow_inactive,
                path: normalize_path(&self.wait.path),
                max_timeout_secs: self.wait.max_timeout,
                interval_ms: interval_millis(self.wait.check_interval)?,
            },
        })
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("deploywait").join("config.toml"))
}

/// Converts a check interval in (possibly fractional) seconds to whole milliseconds.
fn interval_millis(seconds: f64) -> crate::error::Result<u64> {
    let millis = (seconds * 1000.0).round();
    if !millis.is_finite() || millis < 1.0 {
        return Err(WaitError::Config(format!(
            "check interval must be a positive number of seconds, got {seconds}"
        )));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let millis = millis as u64;
    Ok(millis)
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
