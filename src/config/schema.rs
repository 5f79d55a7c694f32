//! Configuration schema for envgraph
//!
//! Configuration is stored at `~/.config/envgraph/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Image providing the in-container SSH server binary
pub const DEFAULT_TOOL_IMAGE: &str = "docker.io/envgraph/envgraph-ssh:latest";

/// VSIX download URL; `{publisher}`, `{name}` and `{version}` are substituted
pub const DEFAULT_MARKETPLACE_URL: &str = "https://{publisher}.gallery.vsassets.io/_apis/public/gallery/publisher/{publisher}/extension/{name}/{version}/assetbyname/Microsoft.VisualStudio.Services.VSIXPackage";

pub const DEFAULT_OH_MY_ZSH_URL: &str = "https://github.com/ohmyzsh/ohmyzsh";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Graph compilation settings
    pub build: BuildConfig,

    /// Local cache settings
    pub cache: CacheConfig,

    /// VS Code extension source
    pub vscode: VscodeConfig,

    /// Shell framework source
    pub shell: ShellConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Graph compilation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Image the SSH server binary is copied from
    pub tool_image: String,

    /// Target platform, e.g. "linux/amd64"
    pub platform: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            tool_image: DEFAULT_TOOL_IMAGE.to_string(),
            platform: "linux/amd64".to_string(),
        }
    }
}

/// Local cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Where extensions and shell frameworks are cached
    /// (defaults to the platform cache directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// VS Code marketplace settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VscodeConfig {
    pub marketplace_url: String,
}

impl Default for VscodeConfig {
    fn default() -> Self {
        Self {
            marketplace_url: DEFAULT_MARKETPLACE_URL.to_string(),
        }
    }
}

/// Shell framework settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Git URL of oh-my-zsh
    pub oh_my_zsh_url: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            oh_my_zsh_url: DEFAULT_OH_MY_ZSH_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[build]"));
        assert!(toml.contains("tool_image"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.build.tool_image, DEFAULT_TOOL_IMAGE);
        assert!(config.cache.dir.is_none());
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [build]
            tool_image = "registry.local/ssh:dev"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.build.tool_image, "registry.local/ssh:dev");
        assert_eq!(config.build.platform, "linux/amd64"); // default preserved
        assert_eq!(config.vscode.marketplace_url, DEFAULT_MARKETPLACE_URL);
    }
}
