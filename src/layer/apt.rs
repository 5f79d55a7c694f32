//! apt layers: custom sources, built-in packages, user packages

use crate::cache;
use crate::layer::LayerBuilder;
use crate::llb::{Backend, Exec, FileAction};
use tracing::debug;

pub const APT_SOURCE_PATH: &str = "/etc/apt/sources.list";

impl<B: Backend> LayerBuilder<'_, B> {
    /// Overlay a custom `sources.list` when one is configured
    pub fn apt_source(&self, root: &B::State) -> B::State {
        let Some(source) = &self.env.package_source else {
            return root.clone();
        };
        debug!(source = %source, "using custom APT source");

        let b = self.backend;
        let dir = b.file(&b.scratch(), FileAction::mkdir("/etc/apt", 0o755));
        let file = b.file(&dir, FileAction::mkfile(APT_SOURCE_PATH, 0o644, source.as_str()));
        b.merge(vec![root.clone(), file])
    }

    /// Install the built-in package set after refreshing package lists
    pub fn builtin_system_packages(&self, root: &B::State) -> B::State {
        let packages = self.env.builtin_packages();
        if packages.is_empty() {
            return root.clone();
        }

        let script = format!(
            "apt-get update && apt-get install -y --no-install-recommends {}",
            packages.join(" ")
        );
        let exec = Exec::shell(script).with_cache(cache::apt_scopes());
        self.backend.run(root, exec)
    }

    /// Install the user's extra apt packages
    pub fn system_packages(&self, root: &B::State) -> B::State {
        if self.env.system_packages.is_empty() {
            return root.clone();
        }

        let mut args = vec!["apt-get".to_string(), "install".to_string(), "-y".to_string()];
        args.extend(self.env.system_packages.iter().cloned());
        let exec = Exec::new(args).with_cache(cache::apt_scopes());
        self.backend.run(root, exec)
    }
}
