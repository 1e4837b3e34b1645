//! Configuration for the evidence pipeline
//!
//! Loaded from `attest.toml` in the run root when present, otherwise defaults
//! apply. All fields are individually defaulted so partial files are fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::{AttestError, Result};

/// Pipeline-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory file-backed attachments are resolved against
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    /// Per-upload timeout in seconds; an expired upload is failed for its key
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,

    /// Optional prefix prepended to every artifact key (run scoping)
    #[serde(default)]
    pub key_prefix: Option<String>,

    /// Separator used when joining suite titles into a display string
    #[serde(default = "default_suite_separator")]
    pub suite_separator: String,
}

fn default_working_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_upload_timeout_secs() -> u64 {
    60
}

fn default_suite_separator() -> String {
    " > ".to_string()
}

impl PipelineConfig {
    /// Load configuration from `{root}/attest.toml` or use defaults
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let config_path = root.join("attest.toml");

        if config_path.exists() {
            debug!("Loading pipeline config from {}", config_path.display());
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)
                .map_err(|e| AttestError::Config(format!("Failed to parse config file: {}", e)))
        } else {
            Ok(Self::default())
        }
    }

    /// Per-upload timeout as a [`Duration`]
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            upload_timeout_secs: default_upload_timeout_secs(),
            key_prefix: None,
            suite_separator: default_suite_separator(),
        }
    }
}
