//! Bytecode generation strategies and the weighted pool that chooses among them.

use std::{collections::BTreeSet, fmt, sync::Arc};

use enum_dispatch::enum_dispatch;
use primitive_types::H160;
use rand::RngCore;
use statefuzz_interface::AddressTaxonomy;
use tracing::trace;

pub use self::{bytes::RandomBytes, calls::CallSequence, instructions::RandomInstructions};
use crate::{Bytes, Error, Result, WeightedSelector};

mod bytes;
mod calls;
mod instructions;
pub(crate) mod opcodes;

/// Inputs shared by all generators for a single [`CodeGenerator::generate()`] call.
pub struct CodegenContext<'a> {
    /// Randomness source; generators must not use any other.
    pub rng: &'a mut dyn RngCore,
    /// Address categories, e.g. for picking call targets.
    pub taxonomy: &'a dyn AddressTaxonomy,
}

impl<'a> CodegenContext<'a> {
    /// Creates a context.
    pub fn new(rng: &'a mut dyn RngCore, taxonomy: &'a dyn AddressTaxonomy) -> Self {
        Self { rng, taxonomy }
    }
}

impl fmt::Debug for CodegenContext<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CodegenContext")
            .finish_non_exhaustive()
    }
}

/// Output of a [`CodeGenerator`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedCode {
    /// Generated bytecode.
    pub code: Bytes,
    /// Addresses embedded in `code` as operands, e.g. call targets.
    pub referenced: BTreeSet<H160>,
}

impl From<Vec<u8>> for GeneratedCode {
    fn from(code: Vec<u8>) -> Self {
        Self {
            code: Bytes(code),
            referenced: BTreeSet::new(),
        }
    }
}

/// Strategy producing bytecode.
///
/// Generators are immutable; everything a call produces is in the returned [`GeneratedCode`],
/// including the addresses it referenced. Each implementation documents how it treats the
/// `length` hint.
#[enum_dispatch]
pub trait CodeGenerator {
    /// Generates code, optionally of the requested length in bytes.
    fn generate(&self, cx: &mut CodegenContext<'_>, length: Option<usize>) -> GeneratedCode;
}

/// A code generator defined outside this crate, shared behind an [`Arc`].
#[derive(Clone)]
pub struct CustomGenerator(Arc<dyn CodeGenerator + Send + Sync>);

impl CustomGenerator {
    /// Wraps `generator`.
    pub fn new(generator: impl CodeGenerator + Send + Sync + 'static) -> Self {
        Self(Arc::new(generator))
    }
}

impl From<Arc<dyn CodeGenerator + Send + Sync>> for CustomGenerator {
    fn from(generator: Arc<dyn CodeGenerator + Send + Sync>) -> Self {
        Self(generator)
    }
}

impl fmt::Debug for CustomGenerator {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("CustomGenerator").finish_non_exhaustive()
    }
}

impl CodeGenerator for CustomGenerator {
    fn generate(&self, cx: &mut CodegenContext<'_>, length: Option<usize>) -> GeneratedCode {
        self.0.generate(cx, length)
    }
}

/// Any code generator that can be registered in a [`CodeGeneratorPool`].
#[enum_dispatch(CodeGenerator)]
#[derive(Debug, Clone)]
pub enum CodeGen {
    /// See [`RandomBytes`].
    RandomBytes,
    /// See [`RandomInstructions`].
    RandomInstructions,
    /// See [`CallSequence`].
    CallSequence,
    /// See [`CustomGenerator`].
    Custom(CustomGenerator),
}

impl CodeGen {
    /// Name of the [`RandomBytes`] generator in configuration.
    pub const BYTES: &'static str = "bytes";
    /// Name of the [`RandomInstructions`] generator in configuration.
    pub const INSTRUCTIONS: &'static str = "instructions";
    /// Name of the [`CallSequence`] generator in configuration.
    pub const CALLS: &'static str = "calls";

    /// Wraps a generator defined outside this crate.
    pub fn custom(generator: impl CodeGenerator + Send + Sync + 'static) -> Self {
        Self::Custom(CustomGenerator::new(generator))
    }

    /// Returns a built-in generator with default settings by its configuration name.
    pub fn builtin(name: &str) -> Option<Self> {
        Some(match name {
            Self::BYTES => RandomBytes::default().into(),
            Self::INSTRUCTIONS => RandomInstructions::default().into(),
            Self::CALLS => CallSequence::default().into(),
            _ => return None,
        })
    }
}

/// Stable identifier assigned to a generator when it is registered in a [`CodeGeneratorPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneratorId(usize);

/// Named code generators with selection weights.
#[derive(Debug, Clone)]
pub struct CodeGeneratorPool {
    generators: Vec<(String, CodeGen)>,
    selector: WeightedSelector<GeneratorId>,
}

impl CodeGeneratorPool {
    /// Creates a pool from `(name, generator, weight)` entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateGenerator`] if a name occurs twice, and the errors of
    /// [`WeightedSelector::new()`] if there are no entries or no positive weight.
    pub fn new(entries: impl IntoIterator<Item = (String, CodeGen, u32)>) -> Result<Self> {
        let mut generators: Vec<(String, CodeGen)> = Vec::new();
        let mut weights = Vec::new();
        for (name, generator, weight) in entries {
            if generators.iter().any(|(existing, _)| *existing == name) {
                return Err(Error::DuplicateGenerator(name));
            }
            weights.push((GeneratorId(generators.len()), weight));
            generators.push((name, generator));
        }
        let selector = WeightedSelector::new(weights)?;
        Ok(Self {
            generators,
            selector,
        })
    }

    /// Draws a generator according to the weights.
    pub fn select(&self, rng: &mut dyn RngCore) -> GeneratorId {
        *self.selector.select(rng)
    }

    /// Resolves a generator name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownGenerator`] if no generator is registered under `name`.
    pub fn by_name(&self, name: &str) -> Result<GeneratorId> {
        self.generators
            .iter()
            .position(|(registered, _)| registered == name)
            .map(GeneratorId)
            .ok_or_else(|| Error::UnknownGenerator(name.to_owned()))
    }

    /// Returns the generator with the specified ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different pool.
    pub fn get(&self, id: GeneratorId) -> &CodeGen {
        &self.generators[id.0].1
    }

    /// Returns the name the generator was registered under.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different pool.
    pub fn name(&self, id: GeneratorId) -> &str {
        &self.generators[id.0].0
    }

    /// Returns the selection weight of a generator.
    pub fn weight(&self, id: GeneratorId) -> Option<u32> {
        self.selector.weight(&id)
    }

    /// Runs the generator with the specified ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different pool.
    pub fn generate(
        &self,
        id: GeneratorId,
        cx: &mut CodegenContext<'_>,
        length: Option<usize>,
    ) -> GeneratedCode {
        let generated = self.get(id).generate(cx, length);
        trace!(
            generator = self.name(id),
            len = generated.code.len(),
            referenced = generated.referenced.len(),
            "generated code"
        );
        generated
    }

    /// Iterates over registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.generators.iter().map(|(name, _)| name.as_str())
    }

    /// Returns the number of registered generators.
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Always `false`; a pool cannot be built without generators.
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::StandardTaxonomy;

    fn pool() -> CodeGeneratorPool {
        CodeGeneratorPool::new([
            ("bytes".to_owned(), CodeGen::from(RandomBytes::default()), 1),
            ("calls".to_owned(), CodeGen::from(CallSequence::default()), 0),
        ])
        .unwrap()
    }

    #[test]
    fn names_resolve_to_stable_ids() {
        let pool = pool();
        let calls = pool.by_name("calls").unwrap();
        assert_eq!(pool.name(calls), "calls");
        assert_eq!(pool.weight(calls), Some(0));
        assert!(matches!(pool.get(calls), CodeGen::CallSequence(_)));
        assert!(matches!(
            pool.by_name("smart"),
            Err(Error::UnknownGenerator(name)) if name == "smart"
        ));
    }

    #[test]
    fn selection_skips_zero_weights() {
        let pool = pool();
        let bytes = pool.by_name("bytes").unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!((0..100).all(|_| pool.select(&mut rng) == bytes));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = CodeGeneratorPool::new([
            ("bytes".to_owned(), CodeGen::from(RandomBytes::default()), 1),
            ("bytes".to_owned(), CodeGen::from(RandomInstructions::default()), 1),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateGenerator(name) if name == "bytes"));
    }

    #[test]
    fn custom_generators_are_dispatched() {
        struct Fixed;

        impl CodeGenerator for Fixed {
            fn generate(&self, _: &mut CodegenContext<'_>, _: Option<usize>) -> GeneratedCode {
                vec![0xfe].into()
            }
        }

        let pool = CodeGeneratorPool::new([("fixed".to_owned(), CodeGen::custom(Fixed), 1)]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let taxonomy = StandardTaxonomy::default();
        let mut cx = CodegenContext::new(&mut rng, &taxonomy);
        let id = pool.by_name("fixed").unwrap();
        assert_eq!(pool.generate(id, &mut cx, None).code, Bytes(vec![0xfe]));
    }

    #[test]
    fn builtins_are_known_by_name() {
        for name in [CodeGen::BYTES, CodeGen::INSTRUCTIONS, CodeGen::CALLS] {
            assert!(CodeGen::builtin(name).is_some(), "{name}");
        }
        assert!(CodeGen::builtin("smart").is_none());
    }
}
