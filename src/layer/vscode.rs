use crate::error::{EnvError, EnvResult};
use crate::layer::LayerBuilder;
use crate::llb::{Backend, FileAction};
use crate::vscode::PluginCache;

/// Extension directory of the VS Code server
pub const EXTENSIONS_DIR: &str = "/root/.vscode-server/extensions";

impl<B: Backend> LayerBuilder<'_, B> {
    /// One merged layer with every requested extension, or `None` when
    /// no extensions are configured.
    ///
    /// Extensions are fetched in order and the first failure stops the
    /// rest.
    pub async fn vscode(&self, plugins: &dyn PluginCache) -> EnvResult<Option<B::State>> {
        if self.env.ide_extensions.is_empty() {
            return Ok(None);
        }

        let b = self.backend;
        let mut inputs = Vec::with_capacity(self.env.ide_extensions.len());
        for ext in &self.env.ide_extensions {
            plugins.ensure_cached(ext).await.map_err(|e| match e {
                e @ EnvError::PluginFetch { .. } => e,
                other => EnvError::PluginFetch {
                    extension: ext.to_string(),
                    reason: other.to_string(),
                },
            })?;

            let layer = b.file(
                &b.scratch(),
                FileAction::copy(
                    b.local(&self.settings.cache_context),
                    plugins.plugin_path(ext),
                    format!("{}/{}", EXTENSIONS_DIR, ext),
                ),
            );
            inputs.push(layer);
        }

        Ok(Some(b.merge(inputs)))
    }
}
