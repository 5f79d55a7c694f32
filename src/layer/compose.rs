//! Graph assembly
//!
//! Runs the layer builders in a fixed order and merges their results:
//!
//! ```text
//! base -> apt source -> built-ins -> pip mirror -> pip packages   (diffed against apt stage)
//!                    \-> user apt packages                        (diffed against apt stage)
//! tool layer, zsh layer, extension layer                          (independent)
//!
//! merge [apt stage, system diff, language diff, tool, zsh, extensions]
//! ```
//!
//! The two package diffs share the apt stage as their ancestor, so each
//! one holds only its own install and can be cached and invalidated on
//! its own.

use crate::environment::Environment;
use crate::error::{EnvError, EnvResult};
use crate::layer::{BuildSettings, LayerBuilder};
use crate::llb::Backend;
use crate::shell::ShellBootstrap;
use crate::vscode::PluginCache;
use tracing::debug;

/// Whether the built-in/mirror/pip chain goes into the merge.
///
/// Only a bare environment on the baseline image may skip it. Anything
/// else needs the built-in step, which also refreshes the apt lists the
/// user package install reads.
fn language_layer_needed(env: &Environment) -> bool {
    !env.system_packages.is_empty()
        || !env.language_packages.is_empty()
        || !env.ide_extensions.is_empty()
        || env.package_mirror.is_some()
        || !env.base_ships_builtins()
}

/// Assemble the full build graph for `env`.
///
/// Collaborator failures abort assembly and come back tagged with the
/// step that failed.
pub async fn compose_state<B: Backend>(
    backend: &B,
    env: &Environment,
    settings: &BuildSettings,
    plugins: &dyn PluginCache,
    shell: &dyn ShellBootstrap,
) -> EnvResult<B::State> {
    let layers = LayerBuilder::new(backend, env, settings);

    let base = layers.base();
    let apt_stage = layers.apt_source(&base);

    let builtin_stage = layers.builtin_system_packages(&apt_stage);
    let mirror_stage = layers.pypi_mirror(&builtin_stage);
    let language_stage = layers.pypi_packages(&mirror_stage);

    let system_stage = layers.system_packages(&apt_stage);

    let tool_stage = layers.tool();

    let shell_stage = layers
        .zsh(&builtin_stage, shell)
        .await
        .map_err(|e| EnvError::step("failed to prepare zsh", e))?;

    let plugin_stage = layers
        .vscode(plugins)
        .await
        .map_err(|e| EnvError::step("failed to get vscode plugins", e))?;

    let mut inputs = vec![apt_stage.clone()];
    if !env.system_packages.is_empty() {
        inputs.push(backend.diff(&apt_stage, &system_stage));
    }
    if language_layer_needed(env) {
        inputs.push(backend.diff(&apt_stage, &language_stage));
    }
    inputs.push(tool_stage);
    if let Some(zsh) = shell_stage {
        inputs.push(backend.diff(&builtin_stage, &zsh));
    }
    inputs.extend(plugin_stage);

    debug!(layers = inputs.len(), "Assembled build graph");
    Ok(backend.merge(inputs))
}
