use std::collections::{BTreeMap, BTreeSet};

use primitive_types::{H160, U256};
use rand::{rngs::StdRng, SeedableRng};
use statefuzz_interface::{AddressKind, AddressTaxonomy, ValueSource};
use tracing::info;

use crate::{
    autofill::{AutofillPolicy, AutofillReport},
    fixture::placeholder_post,
    lazy::Resolver,
    Account, AccountOverrides, AddressSpec, Bytes, CodeGen, CodeGenerator, CodeGeneratorPool,
    CodegenContext, Config, EnvSpec, Error, Fixture, Info, Post, PrestateStore, RandomBytes,
    RandomValues, Result, StandardTaxonomy, Storage, TransactionSpec, UintSpec,
    DEFAULT_FIXTURE_NAME,
};

/// Lowest gas price drawn for transactions.
const MIN_GAS_PRICE: u64 = 1;
/// Highest gas price drawn for transactions.
const MAX_GAS_PRICE: u64 = 100_000_000_000;

/// Configures and builds a [`Template`].
#[derive(Debug)]
pub struct TemplateBuilder<V = RandomValues, A = StandardTaxonomy> {
    config: Config,
    seed: Option<u64>,
    values: V,
    taxonomy: A,
    generators: Vec<(String, CodeGen, u32)>,
}

impl TemplateBuilder {
    /// Starts from `config` with the default value source and taxonomy.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            seed: None,
            values: RandomValues,
            taxonomy: StandardTaxonomy::default(),
            generators: Vec::new(),
        }
    }
}

impl<V, A> TemplateBuilder<V, A> {
    /// Seeds the template's random number generator. Without a seed it is seeded from entropy.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the value source.
    pub fn values<W: ValueSource>(self, values: W) -> TemplateBuilder<W, A> {
        TemplateBuilder {
            config: self.config,
            seed: self.seed,
            values,
            taxonomy: self.taxonomy,
            generators: self.generators,
        }
    }

    /// Replaces the address taxonomy.
    pub fn taxonomy<B: AddressTaxonomy>(self, taxonomy: B) -> TemplateBuilder<V, B> {
        TemplateBuilder {
            config: self.config,
            seed: self.seed,
            values: self.values,
            taxonomy,
            generators: self.generators,
        }
    }

    /// Registers a code generator under `name`, replacing a built-in generator of the same name.
    ///
    /// A `codegen.weights` entry for `name` in the configuration takes precedence over `weight`.
    #[must_use]
    pub fn generator(mut self, name: impl Into<String>, generator: CodeGen, weight: u32) -> Self {
        self.generators.push((name.into(), generator, weight));
        self
    }
}

impl<V: ValueSource, A: AddressTaxonomy> TemplateBuilder<V, A> {
    /// Builds the template.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Config::validate()`], [`Error::UnknownGenerator`] if
    /// `codegen.weights` names an unregistered generator, and the errors of
    /// [`CodeGeneratorPool::new()`].
    pub fn build(self) -> Result<Template<V, A>> {
        let Self {
            config,
            seed,
            values,
            taxonomy,
            generators,
        } = self;
        config.validate()?;

        let pool = build_pool(&config.codegen.weights, generators)?;
        let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        let nonce = match &config.transaction.nonce {
            Some(nonce) => nonce.clone(),
            None => format!("{:#x}", values.nonce(&mut rng)),
        };
        let data = {
            let mut cx = CodegenContext::new(&mut rng, &taxonomy);
            RandomBytes::default()
                .generate(&mut cx, config.transaction.data_length)
                .code
        };

        let tx = &config.transaction;
        let transaction = TransactionSpec {
            secret_key: tx.secret_key()?,
            data: vec![data],
            gas_limit: vec![UintSpec::range(tx.gas_limit_min, tx.gas_limit_max)],
            gas_price: UintSpec::range(MIN_GAS_PRICE, MAX_GAS_PRICE),
            nonce: nonce.clone(),
            to: tx
                .to()?
                .map_or_else(AddressSpec::destination_or_zero, AddressSpec::Fixed),
            value: vec![UintSpec::range(tx.value_min, tx.value_max)],
        };

        let mut template = Template {
            nonce,
            fill_counter: 0,
            info: Info {
                fuzzer: config.info.fuzzer.clone(),
                comment: config.info.comment.clone(),
                filled_with: config.info.filled_with.clone(),
            },
            env: config.env.to_spec()?,
            transaction,
            post: placeholder_post(&config.post.fork),
            prestate: PrestateStore::new(),
            pool,
            policy: AutofillPolicy::new(&config.prestate),
            values,
            taxonomy,
            rng,
            pending_references: BTreeSet::new(),
            last_report: None,
        };
        if config.prestate.seed_precompiled {
            template.seed_precompiled(false);
        }
        Ok(template)
    }
}

/// Registers built-in generators, then custom ones, and applies configured weights.
fn build_pool(
    weights: &BTreeMap<String, u32>,
    custom: Vec<(String, CodeGen, u32)>,
) -> Result<CodeGeneratorPool> {
    let builtins = [CodeGen::BYTES, CodeGen::INSTRUCTIONS, CodeGen::CALLS];
    let mut entries: Vec<(String, CodeGen, u32)> = builtins
        .into_iter()
        .filter(|&name| custom.iter().all(|(custom_name, ..)| custom_name != name))
        .filter_map(|name| Some((name.to_owned(), CodeGen::builtin(name)?, 0)))
        .collect();
    entries.extend(custom);

    for (name, _, weight) in &mut entries {
        if let Some(&configured) = weights.get(name.as_str()) {
            *weight = configured;
        }
    }
    if let Some(unknown) = weights
        .keys()
        .find(|name| entries.iter().all(|(registered, ..)| registered != *name))
    {
        return Err(Error::UnknownGenerator(unknown.clone()));
    }
    CodeGeneratorPool::new(entries)
}

/// Source of randomized state test fixtures.
///
/// A template owns the prestate accumulated across fills, the fill counter and its random number
/// generator. Every [`fill()`](Self::fill()) advances the counter, may create or renew prestate
/// entries and returns a fully resolved [`Fixture`]; calling it twice is therefore not idempotent.
///
/// Templates are `Clone`. A clone continues from the same state and random sequence; use
/// [`reseed()`](Self::reseed()) to make a clone diverge, e.g. when handing it to another worker.
#[derive(Debug, Clone)]
pub struct Template<V = RandomValues, A = StandardTaxonomy> {
    pub(crate) nonce: String,
    pub(crate) fill_counter: u64,
    pub(crate) info: Info,
    pub(crate) env: EnvSpec,
    pub(crate) transaction: TransactionSpec,
    pub(crate) post: Post,
    pub(crate) prestate: PrestateStore,
    pub(crate) pool: CodeGeneratorPool,
    pub(crate) policy: AutofillPolicy,
    pub(crate) values: V,
    pub(crate) taxonomy: A,
    pub(crate) rng: StdRng,
    /// Addresses referenced by code generated since the last argument pass.
    pub(crate) pending_references: BTreeSet<H160>,
    pub(crate) last_report: Option<AutofillReport>,
}

impl Template {
    /// Builds a template from `config` with default collaborators.
    ///
    /// # Errors
    ///
    /// See [`TemplateBuilder::build()`].
    pub fn new(config: Config) -> Result<Self> {
        TemplateBuilder::new(config).build()
    }
}

impl<V: ValueSource, A: AddressTaxonomy> Template<V, A> {
    /// Generates the next fixture.
    ///
    /// 1. Advances the fill counter.
    /// 2. Resolves environment and transaction specs into literals.
    /// 3. Runs the target pass, if enabled.
    /// 4. Runs the argument pass, if enabled; otherwise discards collected references.
    /// 5. Seeds the coinbase with an account without code.
    /// 6. Snapshots the prestate.
    pub fn fill(&mut self) -> Fixture {
        self.fill_counter += 1;

        let mut resolver = Resolver {
            values: &self.values,
            taxonomy: &self.taxonomy,
            rng: &mut self.rng,
        };
        let env = self.env.resolve(&mut resolver);
        let transaction = self.transaction.resolve(&mut resolver);

        let target = self.autofill_target(transaction.to);
        let mut report = AutofillReport::new(target);
        if self.policy.arguments.enabled {
            self.autofill_arguments(transaction.to, &mut report);
        } else {
            self.pending_references.clear();
        }

        self.add_prestate(
            env.current_coinbase,
            AccountOverrides::default().code(Bytes::new()),
        );

        info!(
            round = self.fill_counter,
            outcome = ?report.target,
            created = report.created,
            renewed = report.renewed,
            skipped_by_cadence = report.skipped_by_cadence,
            skipped_by_limit = report.skipped_by_limit,
            accounts = self.prestate.len(),
            "filled template"
        );
        self.last_report = Some(report);

        Fixture {
            info: self.info.clone(),
            env,
            post: self.post.clone(),
            pre: self.prestate.snapshot(),
            transaction,
        }
    }

    /// Generates the next fixture and renders it as a state test file named
    /// [`DEFAULT_FIXTURE_NAME`].
    ///
    /// # Errors
    ///
    /// Propagates serialization errors.
    pub fn fill_json(&mut self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.fill().named(DEFAULT_FIXTURE_NAME))
    }

    /// Inserts or overwrites the entry at `address`.
    ///
    /// Fields missing from `overrides` are filled with generated code, the global nonce, a random
    /// balance and empty storage. Returns the replaced entry, if any.
    pub fn add_prestate(&mut self, address: H160, overrides: AccountOverrides) -> Option<Account> {
        let AccountOverrides {
            balance,
            code,
            nonce,
            storage,
        } = overrides;
        let code = match code {
            Some(code) => code,
            None => {
                let length = self.policy.code_length(&mut self.rng);
                self.generate_code(length)
            }
        };
        let balance = balance.unwrap_or_else(|| self.values.balance(&mut self.rng));
        let account = Account {
            balance,
            code,
            nonce: nonce.unwrap_or_else(|| self.nonce.clone()),
            storage: storage.unwrap_or_else(Storage::new),
        };
        self.prestate.insert(address, account)
    }

    /// Runs a weighted random generator and records the addresses its code references.
    fn generate_code(&mut self, length: Option<usize>) -> Bytes {
        let id = self.pool.select(&mut self.rng);
        let mut cx = CodegenContext::new(&mut self.rng, &self.taxonomy);
        let generated = self.pool.generate(id, &mut cx, length);
        self.pending_references.extend(generated.referenced);
        generated.code
    }

    /// Returns the generator registered under `name`, or a weighted random one if `name` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownGenerator`](crate::Error::UnknownGenerator) for an unregistered
    /// name.
    pub fn pick_codegen(&mut self, name: Option<&str>) -> Result<&CodeGen> {
        let id = match name {
            Some(name) => self.pool.by_name(name)?,
            None => self.pool.select(&mut self.rng),
        };
        Ok(self.pool.get(id))
    }

    /// Adds minimal entries for precompiled addresses; see [`PrestateStore::seed_precompiled()`].
    pub fn seed_precompiled(&mut self, force: bool) -> usize {
        let precompiled = self.taxonomy.addresses(AddressKind::Precompiled);
        self.prestate.seed_precompiled(precompiled, &self.nonce, force)
    }
}

impl<V, A> Template<V, A> {
    /// Replaces the random number generator state.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Number of completed fills.
    pub fn fill_counter(&self) -> u64 {
        self.fill_counter
    }

    /// Nonce shared by the transaction and all generated accounts.
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Global nonce as a number, if it parses as hex (`0x` prefix) or decimal.
    pub fn nonce_value(&self) -> Option<U256> {
        match self.nonce.strip_prefix("0x") {
            Some(hex) => U256::from_str_radix(hex, 16).ok(),
            None => U256::from_dec_str(&self.nonce).ok(),
        }
    }

    /// Provenance copied into fixtures.
    pub fn info(&self) -> &Info {
        &self.info
    }

    /// Mutable provenance.
    pub fn info_mut(&mut self) -> &mut Info {
        &mut self.info
    }

    /// Environment spec.
    pub fn env(&self) -> &EnvSpec {
        &self.env
    }

    /// Mutable environment spec; changes apply from the next fill.
    pub fn env_mut(&mut self) -> &mut EnvSpec {
        &mut self.env
    }

    /// Transaction spec.
    pub fn transaction(&self) -> &TransactionSpec {
        &self.transaction
    }

    /// Mutable transaction spec; changes apply from the next fill.
    pub fn transaction_mut(&mut self) -> &mut TransactionSpec {
        &mut self.transaction
    }

    /// Post state scaffold.
    pub fn post(&self) -> &Post {
        &self.post
    }

    /// Accumulated prestate.
    pub fn prestate(&self) -> &PrestateStore {
        &self.prestate
    }

    /// Code generators.
    pub fn pool(&self) -> &CodeGeneratorPool {
        &self.pool
    }

    /// Autofill policy.
    pub fn policy(&self) -> &AutofillPolicy {
        &self.policy
    }

    /// Mutable autofill policy; changes apply from the next fill. Inverted ranges resolve to
    /// their minimum.
    pub fn policy_mut(&mut self) -> &mut AutofillPolicy {
        &mut self.policy
    }

    /// Address taxonomy.
    pub fn taxonomy(&self) -> &A {
        &self.taxonomy
    }

    /// Autofill summary of the last fill.
    pub fn last_report(&self) -> Option<&AutofillReport> {
        self.last_report.as_ref()
    }
}
