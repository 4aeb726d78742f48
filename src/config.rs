//! Configuration management with environment variable support.
//!
//! This module provides centralized configuration for picture-prompt, supporting:
//! - Environment variables for all configurable values
//! - Sensible defaults for a locally running backend
//! - Builder-style overrides for programmatic configuration
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PICTURE_PROMPT_API_BASE` | Base address of the generation endpoint | `http://127.0.0.1:5000` |
//! | `PICTURE_PROMPT_CONNECT_TIMEOUT` | Connection timeout in seconds | `10` |
//! | `PICTURE_PROMPT_OUTPUT_DIR` | Directory where saved files land | `.` |
//! | `PICTURE_PROMPT_SINGLE_NAME` | File stem of a single-image save | `image` |
//! | `PICTURE_PROMPT_ARCHIVE_NAME` | File name of an archive save | `images.zip` |
//! | `PICTURE_PROMPT_DEFAULT_EXT` | Extension used when the format is unknown | `png` |
//! | `PICTURE_PROMPT_LOG` | Log filter directive | `warn` |
//!
//! # Example
//!
//! ```bash
//! # Talk to a backend on another host
//! export PICTURE_PROMPT_API_BASE="http://10.0.0.5:5000"
//!
//! # Save everything under ~/Pictures
//! export PICTURE_PROMPT_OUTPUT_DIR="$HOME/Pictures"
//! ```

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

// ============================================================================
// Default Values
// ============================================================================

/// Default base address of the generation service
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";

/// Default connection timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// Default stem for a single saved image
pub const DEFAULT_SINGLE_NAME: &str = "image";

/// Default file name for a saved archive
pub const DEFAULT_ARCHIVE_NAME: &str = "images.zip";

/// Extension used when neither the bytes nor the URL reveal a format
pub const DEFAULT_EXTENSION: &str = "png";

/// Default log filter
pub const DEFAULT_LOG_FILTER: &str = "warn";

// ============================================================================
// Environment Variable Names
// ============================================================================

/// Environment variable for the API base address
pub const ENV_API_BASE: &str = "PICTURE_PROMPT_API_BASE";

/// Environment variable for the connection timeout
pub const ENV_CONNECT_TIMEOUT: &str = "PICTURE_PROMPT_CONNECT_TIMEOUT";

/// Environment variable for the output directory
pub const ENV_OUTPUT_DIR: &str = "PICTURE_PROMPT_OUTPUT_DIR";

/// Environment variable for the single-image file stem
pub const ENV_SINGLE_NAME: &str = "PICTURE_PROMPT_SINGLE_NAME";

/// Environment variable for the archive file name
pub const ENV_ARCHIVE_NAME: &str = "PICTURE_PROMPT_ARCHIVE_NAME";

/// Environment variable for the fallback extension
pub const ENV_DEFAULT_EXT: &str = "PICTURE_PROMPT_DEFAULT_EXT";

/// Environment variable for the log filter
pub const ENV_LOG: &str = "PICTURE_PROMPT_LOG";

// ============================================================================
// Legacy Environment Variable Support
// ============================================================================

/// Variable the web front end reads its backend address from
pub const ENV_API_BASE_LEGACY: &str = "REACT_APP_API_URL";

// ============================================================================
// Configuration Getters (with caching)
// ============================================================================

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Centralized configuration for picture-prompt
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote generation service settings
    pub api: ApiSettings,
    /// Local save settings
    pub save: SaveSettings,
}

/// Settings for the remote generation service
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Base address; `/generate` is appended to it
    pub base_url: String,
    /// Connection timeout (seconds)
    pub connect_timeout: u64,
}

/// Settings for files written to disk
#[derive(Debug, Clone)]
pub struct SaveSettings {
    pub output_dir: PathBuf,
    /// Stem of the single-image file (`image` -> `image.png`)
    pub single_name: String,
    pub archive_name: String,
    /// Extension used when the format cannot be detected
    pub default_extension: String,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            api: ApiSettings::from_env(),
            save: SaveSettings::from_env(),
        }
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            api: ApiSettings::defaults(),
            save: SaveSettings::defaults(),
        }
    }

    /// Override the API base address
    pub fn api_base(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }

    /// Override the output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save.output_dir = dir.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ApiSettings {
    /// Create API settings from environment variables
    pub fn from_env() -> Self {
        Self {
            base_url: env::var(ENV_API_BASE)
                .or_else(|_| env::var(ENV_API_BASE_LEGACY))
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            connect_timeout: env::var(ENV_CONNECT_TIMEOUT)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT),
        }
    }

    /// Create API settings with defaults
    pub fn defaults() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl SaveSettings {
    /// Create save settings from environment variables
    pub fn from_env() -> Self {
        Self {
            output_dir: env::var(ENV_OUTPUT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            single_name: env::var(ENV_SINGLE_NAME)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SINGLE_NAME.to_string()),
            archive_name: env::var(ENV_ARCHIVE_NAME)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ARCHIVE_NAME.to_string()),
            default_extension: env::var(ENV_DEFAULT_EXT)
                .ok()
                .map(|s| normalize_extension(&s))
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
        }
    }

    /// Create save settings with defaults
    pub fn defaults() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            single_name: DEFAULT_SINGLE_NAME.to_string(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            default_extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Strip a leading dot and lowercase an extension (".JPG" -> "jpg")
fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}
