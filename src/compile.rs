//! Compilation entry point
//!
//! Assembles the graph for an environment and marshals it into a
//! definition for the configured platform.

use crate::environment::Environment;
use crate::error::EnvResult;
use crate::layer::{compose_state, BuildSettings};
use crate::llb::{Definition, LlbBackend, Platform, State};
use crate::shell::ShellBootstrap;
use crate::vscode::PluginCache;
use tracing::debug;

/// Serialize an assembled state for `platform`
pub fn marshal(state: &State, platform: Platform) -> EnvResult<Definition> {
    state.marshal(platform)
}

/// Compile `env` into a build definition.
///
/// Either the whole graph is produced and serialized, or an error is
/// returned; nothing is retried.
pub async fn compile(
    env: &Environment,
    settings: &BuildSettings,
    plugins: &dyn PluginCache,
    shell: &dyn ShellBootstrap,
) -> EnvResult<Definition> {
    let state = compose_state(&LlbBackend, env, settings, plugins, shell).await?;
    let definition = marshal(&state, settings.platform)?;
    debug!(
        ops = definition.ops.len(),
        root = %definition.root,
        platform = %definition.platform,
        "Compiled build definition"
    );
    Ok(definition)
}
