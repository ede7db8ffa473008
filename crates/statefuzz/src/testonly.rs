//! Test-only code generators with predictable output.

use std::sync::atomic::{AtomicU64, Ordering};

use primitive_types::H160;

use crate::{
    codegen::opcodes::{PUSH20, STOP},
    CodeGenerator, CodegenContext, GeneratedCode,
};

/// Always generates the same code, referencing nothing.
#[derive(Debug, Clone)]
pub struct Constant(pub Vec<u8>);

impl CodeGenerator for Constant {
    fn generate(&self, _cx: &mut CodegenContext<'_>, _length: Option<usize>) -> GeneratedCode {
        self.0.clone().into()
    }
}

/// Generates code pushing every one of `targets`, followed by a call counter.
///
/// No two calls return the same code, so a renewed entry is always distinguishable from a kept
/// one.
#[derive(Debug)]
pub struct Referencing {
    targets: Vec<H160>,
    calls: AtomicU64,
}

impl Referencing {
    /// Creates a generator referencing `targets` on every call.
    pub fn new(targets: impl IntoIterator<Item = H160>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            calls: AtomicU64::new(0),
        }
    }
}

impl CodeGenerator for Referencing {
    fn generate(&self, _cx: &mut CodegenContext<'_>, _length: Option<usize>) -> GeneratedCode {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        let mut code = Vec::with_capacity(self.targets.len() * 21 + 10);
        for target in &self.targets {
            code.push(PUSH20);
            code.extend_from_slice(target.as_bytes());
        }
        // PUSH8
        code.push(0x67);
        code.extend_from_slice(&call.to_be_bytes());
        code.push(STOP);

        GeneratedCode {
            code: code.into(),
            referenced: self.targets.iter().copied().collect(),
        }
    }
}
