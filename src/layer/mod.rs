//! Layer builders
//!
//! Each builder takes the state it should build on and returns the
//! state with one more layer. Builders whose configuration is absent
//! return their input unchanged. `compose` wires them into the final
//! graph.

mod apt;
mod base;
pub mod compose;
mod pypi;
mod shell;
mod tool;
mod vscode;

pub use compose::compose_state;

use crate::config::Config;
use crate::environment::Environment;
use crate::error::EnvResult;
use crate::llb::{Backend, Platform};

/// Name of the local context holding the extension and shell caches
pub const CACHE_CONTEXT: &str = "cache-dir";

/// Process-wide settings the builders read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    /// Image the SSH server binary is copied from
    pub tool_image: String,
    pub platform: Platform,
    /// Local context name for cached extensions and shell frameworks
    pub cache_context: String,
}

impl BuildSettings {
    pub fn from_config(config: &Config) -> EnvResult<Self> {
        Ok(Self {
            tool_image: config.build.tool_image.clone(),
            platform: config.build.platform.parse()?,
            cache_context: CACHE_CONTEXT.to_string(),
        })
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            tool_image: crate::config::schema::DEFAULT_TOOL_IMAGE.to_string(),
            platform: Platform::default(),
            cache_context: CACHE_CONTEXT.to_string(),
        }
    }
}

/// Builds individual layers for one environment
pub struct LayerBuilder<'a, B: Backend> {
    backend: &'a B,
    env: &'a Environment,
    settings: &'a BuildSettings,
}

impl<'a, B: Backend> LayerBuilder<'a, B> {
    pub fn new(backend: &'a B, env: &'a Environment, settings: &'a BuildSettings) -> Self {
        Self {
            backend,
            env,
            settings,
        }
    }
}
