//! Shell bootstrap
//!
//! Provides the oh-my-zsh checkout and the script that wires it up
//! inside the image. The checkout lives in the local cache directory
//! and is cloned once.

use crate::config::{Config, ConfigManager};
use crate::error::{EnvError, EnvResult};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info};

const INSTALL_SCRIPT: &str = include_str!("install.sh");

/// Supplies a shell framework and its install script
#[async_trait]
pub trait ShellBootstrap: Send + Sync {
    /// Script run inside the image after the framework is copied in
    fn install_script(&self) -> &str;

    /// Clone the framework unless the cache directory already exists
    async fn ensure_framework_cloned(&self) -> EnvResult<()>;

    /// Absolute path of the cached framework
    fn framework_dir(&self) -> PathBuf;

    /// Path of the cached framework relative to the cache context
    fn framework_path(&self) -> String;
}

/// oh-my-zsh from git
#[derive(Debug, Clone)]
pub struct ZshManager {
    cache_dir: PathBuf,
    url: String,
}

impl ZshManager {
    pub fn new(cache_dir: PathBuf, url: impl Into<String>) -> Self {
        Self {
            cache_dir,
            url: url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ConfigManager::cache_dir(config),
            config.shell.oh_my_zsh_url.clone(),
        )
    }
}

#[async_trait]
impl ShellBootstrap for ZshManager {
    fn install_script(&self) -> &str {
        INSTALL_SCRIPT
    }

    async fn ensure_framework_cloned(&self) -> EnvResult<()> {
        let dir = self.framework_dir();
        if dir.is_dir() {
            debug!("oh-my-zsh already cached at {}", dir.display());
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| EnvError::io(format!("creating {}", self.cache_dir.display()), e))?;

        info!(url = %self.url, "Cloning oh-my-zsh");
        let output = Command::new("git")
            .arg("clone")
            .arg("--depth")
            .arg("1")
            .arg(&self.url)
            .arg(&dir)
            .output()
            .await
            .map_err(|e| EnvError::command_failed("git clone", e))?;

        if !output.status.success() {
            return Err(EnvError::FrameworkClone {
                url: self.url.clone(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }

    fn framework_dir(&self) -> PathBuf {
        self.cache_dir.join("oh-my-zsh")
    }

    fn framework_path(&self) -> String {
        "oh-my-zsh".to_string()
    }
}
