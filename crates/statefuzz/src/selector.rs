use rand::{
    distributions::{Distribution, WeightedIndex},
    RngCore,
};

use crate::Result;

/// Random choice among candidates with probability proportional to their weight.
///
/// Weights need not sum to any particular total. A zero weight is allowed as long as some other
/// weight is positive; such a candidate is never [selected](Self::select()) but can still be
/// [picked](Self::pick()) explicitly.
#[derive(Debug, Clone)]
pub struct WeightedSelector<K> {
    candidates: Vec<K>,
    weights: Vec<u32>,
    index: WeightedIndex<u64>,
}

impl<K: PartialEq> WeightedSelector<K> {
    /// Creates a selector from `(candidate, weight)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCandidates`](crate::Error::NoCandidates) if `weighted` is empty and
    /// [`Error::AllWeightsZero`](crate::Error::AllWeightsZero) if no weight is positive.
    pub fn new(weighted: impl IntoIterator<Item = (K, u32)>) -> Result<Self> {
        let (candidates, weights): (Vec<_>, Vec<_>) = weighted.into_iter().unzip();
        let index = WeightedIndex::new(weights.iter().map(|&weight| u64::from(weight)))?;
        Ok(Self {
            candidates,
            weights,
            index,
        })
    }

    /// Draws a candidate.
    pub fn select(&self, rng: &mut dyn RngCore) -> &K {
        &self.candidates[self.index.sample(rng)]
    }

    /// Returns the registered candidate equal to `candidate`, bypassing randomness.
    pub fn pick(&self, candidate: &K) -> Option<&K> {
        self.candidates
            .iter()
            .find(|registered| *registered == candidate)
    }

    /// Returns the weight of `candidate`, if it is registered.
    pub fn weight(&self, candidate: &K) -> Option<u32> {
        self.candidates
            .iter()
            .position(|registered| registered == candidate)
            .map(|i| self.weights[i])
    }

    /// Iterates over `(candidate, weight)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u32)> + '_ {
        self.candidates.iter().zip(self.weights.iter().copied())
    }

    /// Returns the number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Always `false`; a selector cannot be built without candidates.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::Error;

    #[test]
    fn construction_requires_a_positive_weight() {
        assert!(matches!(
            WeightedSelector::<&str>::new([]),
            Err(Error::NoCandidates)
        ));
        assert!(matches!(
            WeightedSelector::new([("a", 0), ("b", 0)]),
            Err(Error::AllWeightsZero)
        ));
    }

    #[test]
    fn draws_follow_weights() {
        let selector = WeightedSelector::new([("rare", 1), ("common", 3)]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let common = (0..10_000)
            .filter(|_| *selector.select(&mut rng) == "common")
            .count();
        assert!((7_000..8_000).contains(&common), "{common}");
    }

    #[test]
    fn zero_weight_candidates_can_be_picked() {
        let selector = WeightedSelector::new([("a", 1), ("b", 0)]).unwrap();
        assert_eq!(*selector.pick(&"b").unwrap(), "b");
        assert_eq!(selector.weight(&"b"), Some(0));
        assert_eq!(selector.pick(&"c"), None);
    }

    proptest! {
        #[test]
        fn zero_weight_is_never_selected(seed: u64, weight in 1_u32..1_000) {
            let selector = WeightedSelector::new([("a", weight), ("b", 0)]).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..1_000 {
                prop_assert_eq!(*selector.select(&mut rng), "a");
            }
        }
    }
}
