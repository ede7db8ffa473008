//! Builds templates from arbitrary inputs and checks cross-round invariants of their fixtures.

use anyhow::{ensure, Context as _};
use arbitrary::Arbitrary;
use statefuzz::{
    AddressKind, AddressTaxonomy, CodeGen, Config, Fixture, StandardTaxonomy, TargetOutcome,
    Template, TemplateBuilder,
};

/// Template configuration and number of fills, decoded from fuzzer bytes.
#[derive(Arbitrary, Debug)]
pub struct FuzzInput {
    pub seed: u64,
    pub fills: u8,
    pub target_enabled: bool,
    pub target_renew_every: u8,
    pub arguments_enabled: bool,
    pub arguments_renew_every: u8,
    pub renew_limit: u8,
    /// Weights of the `bytes`, `instructions` and `calls` generators.
    pub weights: [u8; 3],
    pub code_length: Option<(u8, u8)>,
    pub storage_slots: u8,
    pub seed_precompiled: bool,
}

impl FuzzInput {
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        let prestate = &mut config.prestate;
        prestate.target.enabled = self.target_enabled;
        prestate.target.renew_every = self.target_renew_every.into();
        prestate.arguments.enabled = self.arguments_enabled;
        prestate.arguments.renew_every = self.arguments_renew_every.into();
        prestate.arguments.renew_limit = self.renew_limit.into();
        prestate.code_length.min = self.code_length.map(|(min, _)| min.into());
        prestate.code_length.max = self.code_length.map(|(_, max)| max.into());
        prestate.storage_slots.max = usize::from(self.storage_slots % 8);
        prestate.seed_precompiled = self.seed_precompiled;

        let names = [CodeGen::BYTES, CodeGen::INSTRUCTIONS, CodeGen::CALLS];
        for (name, weight) in names.into_iter().zip(self.weights) {
            config.codegen.weights.insert(name.to_owned(), weight.into());
        }
        config
    }

    /// Builds the template, or returns `None` for configurations that are rejected by design.
    pub fn template(&self) -> Option<Template> {
        TemplateBuilder::new(self.config()).seed(self.seed).build().ok()
    }

    /// Fills the template `fills % 16 + 1` times, checking invariants after each round.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant.
    pub fn run(&self) -> anyhow::Result<Vec<Fixture>> {
        let Some(mut template) = self.template() else {
            return Ok(vec![]);
        };
        let taxonomy = StandardTaxonomy::default();
        let mut fixtures: Vec<Fixture> = vec![];

        for round in 1..=u64::from(self.fills % 16) + 1 {
            let fixture = template.fill();
            let report = *template.last_report().context("no report after fill")?;
            ensure!(template.fill_counter() == round, "fill counter skipped a round");

            let to = fixture.transaction.to;
            if self.target_enabled && taxonomy.is_fillable(&to) {
                ensure!(fixture.pre.contains_key(&to), "destination {to:#x} is missing");
            }
            if self.renew_limit > 0 {
                ensure!(
                    report.renewed <= usize::from(self.renew_limit),
                    "{} renewals exceed the limit",
                    report.renewed
                );
            }
            if !self.seed_precompiled {
                let precompiled = taxonomy.addresses(AddressKind::Precompiled);
                ensure!(
                    precompiled.iter().all(|address| !fixture.pre.contains_key(address)),
                    "precompile was autofilled"
                );
            }

            if let Some(previous) = fixtures.last() {
                ensure!(
                    previous.pre.keys().all(|address| fixture.pre.contains_key(address)),
                    "prestate lost an entry"
                );
                ensure!(
                    previous.transaction.nonce == fixture.transaction.nonce,
                    "nonce changed between rounds"
                );
                if report.target == TargetOutcome::Kept && to != fixture.env.current_coinbase {
                    ensure!(
                        previous.pre.get(&to) == fixture.pre.get(&to),
                        "kept destination {to:#x} changed"
                    );
                }
            }
            fixtures.push(fixture);
        }
        Ok(fixtures)
    }
}
