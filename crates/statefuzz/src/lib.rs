//! # Statefuzz
//!
//! Synthesis of randomized EVM state test fixtures. A [`Template`] keeps a world state that grows
//! over many [`fill()`](Template::fill()) calls; every call returns one self-contained
//! [`Fixture`] whose prestate contains every account the transaction and the generated code
//! refer to.
//!
//! ```
//! use statefuzz::{Config, TemplateBuilder};
//!
//! let mut config = Config::default();
//! config.prestate.arguments.enabled = true;
//! let mut template = TemplateBuilder::new(config).seed(42).build()?;
//!
//! let first = template.fill();
//! let second = template.fill();
//! assert_eq!(template.fill_counter(), 2);
//! assert!(second.pre.len() >= first.pre.len());
//! # Ok::<_, statefuzz::Error>(())
//! ```

pub use statefuzz_interface::{
    AddressKind, AddressTaxonomy, ValueSource, MAX_BALANCE, MAX_NONCE, MIN_BALANCE,
};

pub use self::{
    account::{Account, AccountOverrides, Storage},
    autofill::{is_renewal_round, AutofillPolicy, AutofillReport, TargetOutcome},
    codegen::{
        CallSequence, CodeGen, CodeGenerator, CodeGeneratorPool, CodegenContext, CustomGenerator,
        GeneratedCode, GeneratorId, RandomBytes, RandomInstructions,
    },
    config::Config,
    encoding::{parse_address, parse_hash, Bytes},
    error::{Error, Result},
    fixture::{
        placeholder_post, Env, Fixture, Indexes, Info, Post, PostEntry, Transaction,
        DEFAULT_FIXTURE_NAME,
    },
    lazy::{AddressSpec, EnvSpec, HashSpec, TransactionSpec, UintSpec},
    prestate::{PrestateStore, PRECOMPILE_BALANCE},
    selector::WeightedSelector,
    taxonomy::StandardTaxonomy,
    template::{Template, TemplateBuilder},
    values::RandomValues,
};

mod account;
mod autofill;
mod codegen;
pub mod config;
mod encoding;
mod error;
mod fixture;
mod lazy;
mod prestate;
mod selector;
mod taxonomy;
mod template;
#[doc(hidden)]
pub mod testonly;
mod values;
