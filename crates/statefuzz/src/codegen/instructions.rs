use rand::Rng;

use super::{opcodes, CodeGenerator, CodegenContext, GeneratedCode};

/// Random sequence of defined Byzantium opcodes with random `PUSH` immediates.
///
/// The length hint is honored exactly: a `PUSHn` is only emitted when its immediate still fits,
/// otherwise a single-byte opcode is drawn instead. Without a hint, the length is drawn from
/// `1..=max_len`. Never references addresses; a `PUSH20` immediate is just random data here.
#[derive(Debug, Clone)]
pub struct RandomInstructions {
    max_len: usize,
    opcodes: Vec<u8>,
    single_byte: Vec<u8>,
}

impl RandomInstructions {
    /// Default upper bound on the generated length when no hint is given.
    pub const DEFAULT_MAX_LEN: usize = 128;

    /// Creates a generator with the specified upper bound on the unhinted length.
    pub fn new(max_len: usize) -> Self {
        let opcodes: Vec<u8> = (0..=u8::MAX).filter(|&op| opcodes::is_defined(op)).collect();
        let single_byte = opcodes
            .iter()
            .copied()
            .filter(|&op| opcodes::push_size(op).is_none())
            .collect();
        Self {
            max_len: max_len.max(1),
            opcodes,
            single_byte,
        }
    }
}

impl Default for RandomInstructions {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_LEN)
    }
}

impl CodeGenerator for RandomInstructions {
    fn generate(&self, cx: &mut CodegenContext<'_>, length: Option<usize>) -> GeneratedCode {
        let len = length.unwrap_or_else(|| cx.rng.gen_range(1..=self.max_len));
        let mut code = Vec::with_capacity(len);
        while code.len() < len {
            let remaining = len - code.len();
            let opcode = self.opcodes[cx.rng.gen_range(0..self.opcodes.len())];
            match opcodes::push_size(opcode) {
                Some(size) if size < remaining => {
                    code.push(opcode);
                    let start = code.len();
                    code.resize(start + size, 0);
                    cx.rng.fill_bytes(&mut code[start..]);
                }
                // immediate doesn't fit
                Some(_) => {
                    code.push(self.single_byte[cx.rng.gen_range(0..self.single_byte.len())]);
                }
                None => code.push(opcode),
            }
        }
        code.into()
    }
}
