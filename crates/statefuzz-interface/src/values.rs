use primitive_types::{H160, H256, U256};
use rand::{seq::SliceRandom, RngCore};

/// Smallest balance handed out to generated accounts by default (`2^24 - 1`).
pub const MIN_BALANCE: U256 = U256([0x00ff_ffff, 0, 0, 0]);
/// Largest balance handed out to generated accounts by default (`2^80`).
pub const MAX_BALANCE: U256 = U256([0, 0x1_0000, 0, 0]);
/// Largest global nonce drawn by default.
pub const MAX_NONCE: U256 = U256([0xff, 0, 0, 0]);

/// Producer of scalar random values.
///
/// Every method receives the caller's random number generator. Implementations must not keep
/// randomness of their own; otherwise fixtures stop being reproducible from a seed.
pub trait ValueSource {
    /// Returns an integer in `min..=max`. Callers guarantee `min <= max`.
    fn uint(&self, rng: &mut dyn RngCore, min: U256, max: U256) -> U256;

    /// Returns a uniformly random 32-byte hash.
    fn hash(&self, rng: &mut dyn RngCore) -> H256 {
        let mut bytes = [0_u8; 32];
        rng.fill_bytes(&mut bytes);
        H256(bytes)
    }

    /// Picks one of `candidates`, or returns `None` if there are none.
    fn address(&self, rng: &mut dyn RngCore, candidates: &[H160]) -> Option<H160> {
        candidates.choose(rng).copied()
    }

    /// Returns a balance for a freshly generated account.
    fn balance(&self, rng: &mut dyn RngCore) -> U256 {
        self.uint(rng, MIN_BALANCE, MAX_BALANCE)
    }

    /// Returns a nonce to be shared by all accounts of a template.
    fn nonce(&self, rng: &mut dyn RngCore) -> U256 {
        self.uint(rng, U256::zero(), MAX_NONCE)
    }
}
