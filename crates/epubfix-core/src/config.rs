use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of fetch attempts per image (including the first).
    pub max_attempts: u32,
    /// Constant delay in seconds between attempts (e.g. 0.5 = 500ms).
    pub backoff_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_secs: 2.0,
        }
    }
}

/// Global configuration loaded from `~/.config/epubfix/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixerConfig {
    /// Text tag that prefixes a placeholder paragraph, directly followed by the URL.
    pub marker: String,
    /// Substring the URL host must contain for the image to be fetched.
    pub trusted_host: String,
    /// Content root inside the archive (e.g. "content" or "OEBPS").
    pub content_dir: String,
    /// Directory under `content_dir` holding the text documents.
    pub text_dir: String,
    /// Directory under `content_dir` receiving downloaded images.
    pub images_dir: String,
    /// Per-request network timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent sent with image requests.
    pub user_agent: String,
    /// Optional retry policy; if missing, built-in defaults are used.
    pub retry: Option<RetryConfig>,
}

impl Default for FixerConfig {
    fn default() -> Self {
        Self {
            marker: "<图片>".to_string(),
            trusted_host: "mitemin.net".to_string(),
            content_dir: "content".to_string(),
            text_dir: "Text".to_string(),
            images_dir: "images".to_string(),
            timeout_secs: 15,
            user_agent: concat!("epubfix/", env!("CARGO_PKG_VERSION")).to_string(),
            retry: None,
        }
    }
}

impl FixerConfig {
    /// `<root>/<content_dir>/<text_dir>`.
    pub fn text_root(&self, root: &Path) -> PathBuf {
        root.join(&self.content_dir).join(&self.text_dir)
    }

    /// `<root>/<content_dir>/<images_dir>`.
    pub fn images_root(&self, root: &Path) -> PathBuf {
        root.join(&self.content_dir).join(&self.images_dir)
    }

    /// Directory part of image references written into text documents, e.g. `../images`.
    pub fn image_href_dir(&self) -> String {
        format!("../{}", self.images_dir)
    }
}

/// Existing `config.toml` under the XDG config dirs, if any.
pub fn config_path() -> Result<Option<PathBuf>> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("epubfix")?;
    Ok(xdg_dirs.find_config_file("config.toml"))
}

/// Load configuration from `path`, or from the XDG config file when `path` is `None`.
///
/// An explicit path must exist; a missing default file yields the built-in defaults.
pub fn load(path: Option<&Path>) -> Result<FixerConfig> {
    let path = match path {
        Some(p) if !p.exists() => anyhow::bail!("config file not found: {}", p.display()),
        Some(p) => p.to_path_buf(),
        None => match config_path()? {
            Some(p) => p,
            None => {
                tracing::debug!("no config file found, using defaults");
                return Ok(FixerConfig::default());
            }
        },
    };

    let data =
        fs::read_to_string(&path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: FixerConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
