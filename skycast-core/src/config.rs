use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

/// Environment variable that overrides every other base-URL source.
pub const ENV_API_BASE: &str = "SKYCAST_API_BASE";

/// Gateway used when neither the environment nor the config file names one.
pub const DEFAULT_BASE_URL: &str = "https://q3sti5pug5.execute-api.us-east-1.amazonaws.com";

/// Top-level configuration stored on disk.
///
/// Resolved once at startup and handed to
/// [`GatewayClient::new`](crate::GatewayClient::new); nothing in this crate
/// reads configuration globally after that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the weather gateway.
    ///
    /// Example TOML:
    /// base_url = "https://example.execute-api.us-east-1.amazonaws.com"
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Config {
    /// Build a config pointing at an explicit gateway.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Resolve the effective configuration for this process.
    ///
    /// Precedence: the `SKYCAST_API_BASE` environment variable, then the
    /// config file, then the built-in default gateway.
    pub fn resolve() -> Result<Self> {
        if let Ok(value) = env::var(ENV_API_BASE) {
            let value = value.trim();
            if !value.is_empty() {
                return Ok(Self::with_base_url(value));
            }
        }

        Self::load()
    }

    /// Load config from disk, or return the default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, fall back to the default gateway.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
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
        let dirs = ProjectDirs::from("dev", "skycast", "skycast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
