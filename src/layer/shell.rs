use crate::environment::Shell;
use crate::error::EnvResult;
use crate::layer::LayerBuilder;
use crate::llb::{Backend, Exec, FileAction};
use crate::shell::ShellBootstrap;

pub const OH_MY_ZSH_DIR: &str = "/root/.oh-my-zsh";
pub const ZSH_INSTALL_PATH: &str = "/root/install-oh-my-zsh.sh";

impl<B: Backend> LayerBuilder<'_, B> {
    /// Copy oh-my-zsh into `root` and run its setup, or `None` when no
    /// shell is requested. `root` must already have zsh installed.
    pub async fn zsh(
        &self,
        root: &B::State,
        shell: &dyn ShellBootstrap,
    ) -> EnvResult<Option<B::State>> {
        if self.env.shell != Some(Shell::Zsh) {
            return Ok(None);
        }

        shell.ensure_framework_cloned().await?;

        let b = self.backend;
        let framework = b.file(
            root,
            FileAction::copy(
                b.local(&self.settings.cache_context),
                shell.framework_path(),
                OH_MY_ZSH_DIR,
            ),
        );
        let script = b.file(
            &framework,
            FileAction::mkfile(ZSH_INSTALL_PATH, 0o644, shell.install_script()),
        );
        Ok(Some(b.run(&script, Exec::new(["bash", ZSH_INSTALL_PATH]))))
    }
}
