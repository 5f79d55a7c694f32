use crate::layer::LayerBuilder;
use crate::llb::{Backend, FileAction};

/// Location of the SSH server inside the tool image
pub const TOOL_SOURCE_PATH: &str = "/usr/bin/envgraph-ssh";

/// Where the SSH server lands in the environment
pub const TOOL_INSTALL_PATH: &str = "/var/envgraph/bin/envgraph-ssh";

impl<B: Backend> LayerBuilder<'_, B> {
    /// Standalone layer carrying the SSH server binary. Always present.
    pub fn tool(&self) -> B::State {
        let b = self.backend;
        let image = b.image(&self.settings.tool_image);
        b.file(
            &b.scratch(),
            FileAction::copy(image, TOOL_SOURCE_PATH, TOOL_INSTALL_PATH),
        )
    }
}
