use std::collections::BTreeSet;

use primitive_types::H160;
use rand::{seq::SliceRandom, Rng};
use statefuzz_interface::AddressKind;

use super::{opcodes, CodeGenerator, CodegenContext, GeneratedCode};
use crate::Bytes;

/// Sequence of message calls to well-known accounts.
///
/// Each call pushes memory offsets and sizes, a value (for `CALL` and `CALLCODE`), a `PUSH20`
/// target drawn from the taxonomy's sending, state and precompiled accounts, and either the
/// remaining gas or a random gas amount. The call result is then popped or stored to a random
/// slot. The sequence ends with `STOP`.
///
/// The length hint is ignored; between one and `max_calls` calls are emitted. Every call target
/// is reported in [`GeneratedCode::referenced`].
#[derive(Debug, Clone)]
pub struct CallSequence {
    max_calls: usize,
}

impl CallSequence {
    /// Default upper bound on the number of calls.
    pub const DEFAULT_MAX_CALLS: usize = 4;

    /// Creates a generator emitting at most `max_calls` calls.
    pub fn new(max_calls: usize) -> Self {
        Self {
            max_calls: max_calls.max(1),
        }
    }
}

impl Default for CallSequence {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_CALLS)
    }
}

impl CodeGenerator for CallSequence {
    fn generate(&self, cx: &mut CodegenContext<'_>, _length: Option<usize>) -> GeneratedCode {
        let targets: Vec<H160> = AddressKind::ALL
            .into_iter()
            .flat_map(|kind| cx.taxonomy.addresses(kind).iter().copied())
            .collect();

        let mut code = Vec::new();
        let mut referenced = BTreeSet::new();
        for _ in 0..cx.rng.gen_range(1..=self.max_calls) {
            let call = opcodes::CALLS[cx.rng.gen_range(0..opcodes::CALLS.len())];

            // retSize, retOffset, argsSize, argsOffset
            for _ in 0..4 {
                code.extend([opcodes::PUSH1, cx.rng.gen_range(0..=0x40)]);
            }
            if opcodes::VALUE_CALLS.contains(&call) {
                code.extend([opcodes::PUSH1, cx.rng.gen()]);
            }

            let target = targets.choose(&mut *cx.rng).copied().unwrap_or_else(|| {
                let mut address = H160::zero();
                cx.rng.fill_bytes(address.as_bytes_mut());
                address
            });
            code.push(opcodes::PUSH20);
            code.extend_from_slice(target.as_bytes());
            referenced.insert(target);

            if cx.rng.gen_bool(0.5) {
                code.push(opcodes::GAS);
            } else {
                code.push(opcodes::PUSH4);
                code.extend(cx.rng.gen::<u32>().to_be_bytes());
            }
            code.push(call);

            if cx.rng.gen_bool(0.5) {
                code.push(opcodes::POP);
            } else {
                code.extend([opcodes::PUSH1, cx.rng.gen(), opcodes::SSTORE]);
            }
        }
        code.push(opcodes::STOP);

        GeneratedCode {
            code: Bytes(code),
            referenced,
        }
    }
}
