//! Environment descriptor
//!
//! The resolved description of a development environment: base OS and
//! language, optional GPU toolkit, package lists, mirror overrides and
//! IDE extensions. Callers build and own their own `Environment`; the
//! graph compiler only reads it.
//!
//! Environment files are TOML:
//!
//! ```toml
//! os = "ubuntu20.04"
//! language = "python"
//! system_packages = ["vim"]
//! language_packages = ["numpy"]
//!
//! [gpu]
//! cuda = "11.2"
//! cudnn = "8"
//! ```

mod extension;

pub use extension::Extension;

use crate::error::{EnvError, EnvResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default target OS
pub const DEFAULT_OS: &str = "ubuntu20.04";

/// Default interpreter
pub const DEFAULT_LANGUAGE: &str = "python";

/// Image used when no GPU toolkit is requested
pub const BASELINE_IMAGE: &str = "docker.io/library/python:3.8";

/// Packages always installed. The baseline image already ships these.
pub const DEFAULT_BUILTIN_PACKAGES: &[&str] = &["curl", "openssh-client"];

/// GPU toolkit versions, e.g. CUDA `11.2` with cuDNN `8`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuToolkit {
    pub cuda: String,
    pub cudnn: String,
}

/// Interactive shell to bootstrap in the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
    /// zsh with oh-my-zsh
    Zsh,
}

/// Description of the desired environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Environment {
    /// Target OS identifier, used in GPU base image tags
    pub os: String,

    /// Interpreter, e.g. "python"
    pub language: String,

    /// GPU toolkit, absent for CPU-only environments
    pub gpu: Option<GpuToolkit>,

    /// System packages every environment gets
    pub builtin_system_packages: Vec<String>,

    /// Extra apt packages requested by the user
    pub system_packages: Vec<String>,

    /// pip packages
    pub language_packages: Vec<String>,

    /// Literal contents for /etc/apt/sources.list
    pub package_source: Option<String>,

    /// PyPI index URL
    pub package_mirror: Option<String>,

    /// VS Code extensions to preinstall
    pub ide_extensions: Vec<Extension>,

    /// Shell to bootstrap
    pub shell: Option<Shell>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            os: DEFAULT_OS.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            gpu: None,
            builtin_system_packages: DEFAULT_BUILTIN_PACKAGES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            system_packages: Vec::new(),
            language_packages: Vec::new(),
            package_source: None,
            package_mirror: None,
            ide_extensions: Vec::new(),
            shell: None,
        }
    }
}

impl Environment {
    /// Parse an environment from TOML
    pub fn parse(content: &str) -> EnvResult<Self> {
        toml::from_str(content).map_err(|e| EnvError::EnvironmentInvalid {
            path: "<inline>".into(),
            reason: e.to_string(),
        })
    }

    /// Load an environment file from disk
    pub async fn from_file(path: &Path) -> EnvResult<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            EnvError::io(format!("reading environment file {}", path.display()), e)
        })?;
        toml::from_str(&content).map_err(|e| EnvError::EnvironmentInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn gpu_enabled(&self) -> bool {
        self.gpu.is_some()
    }

    /// Name of the language package manager's system package
    pub fn package_manager_package(&self) -> String {
        format!("{}-pip", self.language)
    }

    /// Image reference the graph starts from.
    ///
    /// GPU bases come from the CUDA devel images, which carry no Python.
    pub fn base_image(&self) -> String {
        match &self.gpu {
            None => BASELINE_IMAGE.to_string(),
            Some(gpu) => format!(
                "nvidia/cuda:{}.0-cudnn{}-devel-{}",
                gpu.cuda, gpu.cudnn, self.os
            ),
        }
    }

    /// Full built-in package set, in install order.
    ///
    /// Configured built-ins first, then the interpreter and its package
    /// manager for GPU bases, then the shell. Each name appears once.
    pub fn builtin_packages(&self) -> Vec<String> {
        let mut packages = self.builtin_system_packages.clone();
        let mut push = |pkg: String| {
            if !packages.contains(&pkg) {
                packages.push(pkg);
            }
        };

        if self.gpu_enabled() {
            push(self.language.clone());
            push(self.package_manager_package());
        }
        if self.shell == Some(Shell::Zsh) {
            push("zsh".to_string());
        }

        packages
    }

    /// Whether the base image already provides every built-in package
    pub fn base_ships_builtins(&self) -> bool {
        !self.gpu_enabled()
            && self
                .builtin_packages()
                .iter()
                .all(|p| DEFAULT_BUILTIN_PACKAGES.contains(&p.as_str()))
    }
}
