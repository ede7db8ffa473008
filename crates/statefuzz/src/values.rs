use primitive_types::U256;
use rand::{Rng, RngCore};
use statefuzz_interface::ValueSource;

/// Distance from a bound still considered "near" it.
const NEAR_BOUND: u64 = 16;

/// Default [`ValueSource`]: integers are biased towards the bounds of the requested range.
///
/// Roughly one draw in ten returns the minimum, one the maximum, one a value within 16 of the
/// minimum and one a value within 16 of the maximum; the rest are uniform over the range.
/// Off-by-one and overflow bugs live at the bounds, so they are sampled far more often than a
/// uniform distribution would.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomValues;

impl ValueSource for RandomValues {
    fn uint(&self, rng: &mut dyn RngCore, min: U256, max: U256) -> U256 {
        if min >= max {
            return min;
        }
        let near = (max - min).min(NEAR_BOUND.into());
        match rng.gen_range(0..10) {
            0 => min,
            1 => max,
            2 => min + uniform_u256(rng, U256::zero(), near),
            3 => max - uniform_u256(rng, U256::zero(), near),
            _ => uniform_u256(rng, min, max),
        }
    }
}

/// Draws uniformly from `min..=max`, up to a negligible modulo bias. Returns `min` if `min >= max`.
pub(crate) fn uniform_u256(rng: &mut dyn RngCore, min: U256, max: U256) -> U256 {
    if min >= max {
        return min;
    }
    let mut bytes = [0_u8; 32];
    rng.fill_bytes(&mut bytes);
    let raw = U256::from_big_endian(&bytes);
    let span = max - min;
    if span == U256::MAX {
        raw
    } else {
        min + raw % (span + 1)
    }
}

/// Draws uniformly from `min..=max` for machine-sized ranges. Returns `min` if `min >= max`.
pub(crate) fn uniform_usize(rng: &mut dyn RngCore, min: usize, max: usize) -> usize {
    if min >= max {
        min
    } else {
        rng.gen_range(min..=max)
    }
}
