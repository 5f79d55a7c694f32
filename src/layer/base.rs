use crate::layer::LayerBuilder;
use crate::llb::Backend;

impl<B: Backend> LayerBuilder<'_, B> {
    /// The image everything else builds on.
    ///
    /// GPU environments start from a CUDA devel image, which does not
    /// ship the interpreter; `Environment::builtin_packages` accounts
    /// for that.
    pub fn base(&self) -> B::State {
        self.backend.image(&self.env.base_image())
    }
}
