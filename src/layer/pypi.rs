//! pip layers: index mirror and language packages

use crate::cache;
use crate::layer::LayerBuilder;
use crate::llb::{Backend, Exec, FileAction};
use tracing::debug;

pub const PIP_CONFIG_DIR: &str = "/root/.config/pip";
pub const PIP_CONFIG_PATH: &str = "/root/.config/pip/pip.conf";

fn pip_config(mirror: &str) -> String {
    format!("[global]\nindex-url = {}\n", mirror)
}

impl<B: Backend> LayerBuilder<'_, B> {
    /// Point pip at a custom index when one is configured
    pub fn pypi_mirror(&self, root: &B::State) -> B::State {
        let Some(mirror) = &self.env.package_mirror else {
            return root.clone();
        };
        debug!(mirror = %mirror, "using custom PyPI mirror");

        let b = self.backend;
        let dir = b.file(&b.scratch(), FileAction::mkdir(PIP_CONFIG_DIR, 0o755));
        let file = b.file(&dir, FileAction::mkfile(PIP_CONFIG_PATH, 0o644, pip_config(mirror)));
        b.merge(vec![root.clone(), file])
    }

    /// `pip install` the requested packages
    pub fn pypi_packages(&self, root: &B::State) -> B::State {
        if self.env.language_packages.is_empty() {
            return root.clone();
        }

        let mut args = vec!["pip".to_string(), "install".to_string()];
        args.extend(self.env.language_packages.iter().cloned());
        let exec = Exec::new(args).with_cache(cache::pip_scopes());
        self.backend.run(root, exec)
    }
}
