//! Automatic creation and renewal of prestate entries.

use std::{collections::BTreeSet, mem};

use primitive_types::H160;
use rand::{seq::SliceRandom, RngCore};
use statefuzz_interface::{AddressTaxonomy, ValueSource};
use tracing::debug;

use crate::{
    config::{ArgumentsConfig, CodeLengthConfig, PrestateConfig, StorageSlotsConfig, TargetConfig},
    values::uniform_usize,
    AccountOverrides, Storage, Template,
};

/// Returns whether an existing entry is renewed in round `fill_counter`. `renew_every = 0` acts
/// as 1.
pub fn is_renewal_round(renew_every: u64, fill_counter: u64) -> bool {
    fill_counter % renew_every.max(1) == 0
}

/// Decides which addresses get (re)generated prestate entries and what they are filled with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutofillPolicy {
    /// Target pass settings.
    pub target: TargetConfig,
    /// Argument pass settings.
    pub arguments: ArgumentsConfig,
    /// Length of generated code.
    pub code_length: CodeLengthConfig,
    /// Number of random storage slots.
    pub storage_slots: StorageSlotsConfig,
}

impl AutofillPolicy {
    /// Extracts the policy from the prestate configuration.
    pub fn new(config: &PrestateConfig) -> Self {
        Self {
            target: config.target,
            arguments: config.arguments,
            code_length: config.code_length,
            storage_slots: config.storage_slots,
        }
    }

    /// Draws the length hint for generated code, or `None` to let the generator choose.
    pub fn code_length(&self, rng: &mut dyn RngCore) -> Option<usize> {
        let min = self.code_length.min?;
        Some(match self.code_length.max {
            Some(max) => uniform_usize(rng, min, max),
            None => min,
        })
    }

    /// Draws the number of storage slots for a generated account.
    pub fn storage_slots(&self, rng: &mut dyn RngCore) -> usize {
        uniform_usize(rng, self.storage_slots.min, self.storage_slots.max)
    }
}

/// What the target pass did in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOutcome {
    /// The pass is disabled.
    Disabled,
    /// The destination is precompiled or unclassified.
    Skipped,
    /// The destination had no entry and got one.
    Created,
    /// The destination's entry was regenerated.
    Renewed,
    /// The destination's entry was left as is because the round is not a renewal round.
    Kept,
}

/// Summary of the autofill passes of one round.
///
/// The counters cover the argument pass only; the target pass is summarized by `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutofillReport {
    /// Outcome of the target pass.
    pub target: TargetOutcome,
    /// Referenced addresses that got their first entry.
    pub created: usize,
    /// Referenced addresses whose existing entry was regenerated.
    pub renewed: usize,
    /// Existing entries left alone because the round is not a renewal round.
    pub skipped_by_cadence: usize,
    /// Existing entries left alone because `renew_limit` was reached.
    pub skipped_by_limit: usize,
}

impl AutofillReport {
    pub(crate) fn new(target: TargetOutcome) -> Self {
        Self {
            target,
            created: 0,
            renewed: 0,
            skipped_by_cadence: 0,
            skipped_by_limit: 0,
        }
    }
}

impl<V: ValueSource, A: AddressTaxonomy> Template<V, A> {
    pub(crate) fn autofill_target(&mut self, to: H160) -> TargetOutcome {
        if !self.policy.target.enabled {
            return TargetOutcome::Disabled;
        }
        if !self.taxonomy.is_fillable(&to) {
            debug!(address = ?to, "destination is not fillable");
            return TargetOutcome::Skipped;
        }

        if !self.prestate.contains(&to) {
            self.autofill_account(to);
            TargetOutcome::Created
        } else if is_renewal_round(self.policy.target.renew_every, self.fill_counter) {
            self.autofill_account(to);
            TargetOutcome::Renewed
        } else {
            debug!(
                address = ?to,
                round = self.fill_counter,
                "destination kept until its renewal round"
            );
            TargetOutcome::Kept
        }
    }

    /// Fills addresses referenced by code generated since the last argument pass.
    ///
    /// Code generated here can reference further addresses; those are handled in further waves
    /// of the same round, so the resulting snapshot never lacks a referenced fillable account.
    /// Every address is handled at most once per round, and `to` is left to the target pass.
    pub(crate) fn autofill_arguments(&mut self, to: H160, report: &mut AutofillReport) {
        let renewal_round = is_renewal_round(self.policy.arguments.renew_every, self.fill_counter);
        let renew_limit = self.policy.arguments.renew_limit;
        let mut handled = BTreeSet::from([to]);

        loop {
            let mut wave: Vec<H160> = mem::take(&mut self.pending_references)
                .into_iter()
                .filter(|address| handled.insert(*address))
                .collect();
            if wave.is_empty() {
                break;
            }
            wave.shuffle(&mut self.rng);

            for address in wave {
                if self.taxonomy.is_precompiled(&address) {
                    continue;
                }
                if !self.taxonomy.is_fillable(&address) {
                    debug!(address = ?address, "unclassified reference");
                    continue;
                }

                if !self.prestate.contains(&address) {
                    self.autofill_account(address);
                    report.created += 1;
                } else if !renewal_round {
                    debug!(address = ?address, "renewal skipped by cadence");
                    report.skipped_by_cadence += 1;
                } else if renew_limit > 0 && report.renewed >= renew_limit {
                    debug!(address = ?address, "renewal skipped by limit");
                    report.skipped_by_limit += 1;
                } else {
                    self.autofill_account(address);
                    report.renewed += 1;
                }
            }
        }
    }

    /// Writes a fresh entry: generated code, random storage and balance, global nonce.
    fn autofill_account(&mut self, address: H160) {
        let slots = self.policy.storage_slots(&mut self.rng);
        let storage: Storage = (0..slots)
            .map(|_| (self.values.hash(&mut self.rng), self.values.hash(&mut self.rng)))
            .collect();
        self.add_prestate(address, AccountOverrides::default().storage(storage));
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn cadence() {
        let rounds: Vec<_> = (1..=6).filter(|&c| is_renewal_round(2, c)).collect();
        assert_eq!(rounds, [2, 4, 6]);
        assert!((1..=6).all(|c| is_renewal_round(1, c)));
        assert!((1..=6).all(|c| is_renewal_round(0, c)));
    }

    #[test]
    fn code_length_hint() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut policy = AutofillPolicy::new(&PrestateConfig::default());
        assert_eq!(policy.code_length(&mut rng), None);

        policy.code_length = CodeLengthConfig {
            min: Some(12),
            max: None,
        };
        assert_eq!(policy.code_length(&mut rng), Some(12));

        policy.code_length.max = Some(12);
        assert_eq!(policy.code_length(&mut rng), Some(12));

        policy.code_length.max = Some(20);
        for _ in 0..100 {
            let len = policy.code_length(&mut rng).unwrap();
            assert!((12..=20).contains(&len), "{len}");
        }
    }

    proptest! {
        #[test]
        fn storage_slots_stay_in_range(seed: u64, min in 0_usize..8, extra in 0_usize..8) {
            let mut policy = AutofillPolicy::new(&PrestateConfig::default());
            policy.storage_slots = StorageSlotsConfig { min, max: min + extra };
            let mut rng = StdRng::seed_from_u64(seed);
            let slots = policy.storage_slots(&mut rng);
            prop_assert!((min..=min + extra).contains(&slots));
        }
    }
}
