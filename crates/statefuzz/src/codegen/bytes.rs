use rand::Rng;

use super::{CodeGenerator, CodegenContext, GeneratedCode};

/// Uniformly random bytes, valid opcodes or not.
///
/// The length hint is honored exactly. Without a hint, the length is drawn from `1..=max_len`.
/// Never references addresses.
#[derive(Debug, Clone)]
pub struct RandomBytes {
    max_len: usize,
}

impl RandomBytes {
    /// Default upper bound on the generated length when no hint is given.
    pub const DEFAULT_MAX_LEN: usize = 64;

    /// Creates a generator with the specified upper bound on the unhinted length.
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len: max_len.max(1),
        }
    }
}

impl Default for RandomBytes {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_LEN)
    }
}

impl CodeGenerator for RandomBytes {
    fn generate(&self, cx: &mut CodegenContext<'_>, length: Option<usize>) -> GeneratedCode {
        let len = length.unwrap_or_else(|| cx.rng.gen_range(1..=self.max_len));
        let mut code = vec![0; len];
        cx.rng.fill_bytes(&mut code);
        code.into()
    }
}
